//! Static prologue and epilogue text for consolidated output files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::CodecGenError;
use crate::lang::OutputLayout;
use crate::template::CODEC_HASH_PLACEHOLDER;

/// Override file for the header prologue.
pub const HEADER_INCLUDES_FILE: &str = "header_includes.txt";
/// Override file for the source prologue.
pub const SOURCE_HEADER_FILE: &str = "source_header.txt";
/// Override file for the epilogue of both files.
pub const FOOTER_FILE: &str = "footer.txt";

/// Text written around the per-method fragments of a consolidated pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boilerplate {
    pub header_includes: String,
    pub source_header: String,
    pub footer: String,
}

impl Boilerplate {
    /// The built-in text for a layout. Per-artifact layouts need none.
    pub fn builtin(layout: OutputLayout, namespace: &str) -> Self {
        match layout {
            OutputLayout::PerArtifact { .. } => Self::default(),
            OutputLayout::Consolidated { header, .. } => Self {
                header_includes: format!(
                    "// Generated(\"{CODEC_HASH_PLACEHOLDER}\")\n\
                     #pragma once\n\
                     \n\
                     #include <cstdint>\n\
                     #include <string>\n\
                     #include <unordered_map>\n\
                     #include <utility>\n\
                     #include <vector>\n\
                     \n\
                     #include <boost/uuid/uuid.hpp>\n\
                     \n\
                     #include \"hazelcast/client/protocol/ClientMessage.h\"\n\
                     #include \"hazelcast/client/impl/BaseEventHandler.h\"\n\
                     \n\
                     namespace {namespace} {{\n\
                     \n"
                ),
                source_header: format!(
                    "// Generated(\"{CODEC_HASH_PLACEHOLDER}\")\n\
                     #include \"{header}\"\n\
                     \n\
                     namespace {namespace} {{\n\
                     \n"
                ),
                footer: format!("}} // namespace {namespace}\n"),
            },
        }
    }

    /// The built-in text with any override files from `dir` applied.
    ///
    /// ## Errors
    ///
    /// Returns [`CodecGenError::Io`] if an override file exists but cannot
    /// be read.
    pub fn load(
        layout: OutputLayout,
        namespace: &str,
        dir: Option<&Path>,
    ) -> Result<Self, CodecGenError> {
        let mut boilerplate = Self::builtin(layout, namespace);
        let Some(dir) = dir else {
            return Ok(boilerplate);
        };

        for (file, slot) in [
            (HEADER_INCLUDES_FILE, &mut boilerplate.header_includes),
            (SOURCE_HEADER_FILE, &mut boilerplate.source_header),
            (FOOTER_FILE, &mut boilerplate.footer),
        ] {
            let path = dir.join(file);
            if path.is_file() {
                *slot = fs::read_to_string(&path).map_err(|e| CodecGenError::io(&path, e))?;
                debug!(path = %path.display(), "using boilerplate override");
            }
        }

        Ok(boilerplate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CPP: OutputLayout = OutputLayout::Consolidated {
        header: "codecs.h",
        source: "codecs.cpp",
    };

    #[test]
    fn consolidated_builtin_opens_and_closes_the_namespace() {
        let boilerplate = Boilerplate::builtin(CPP, "protocol::codec");

        assert!(boilerplate.header_includes.contains("#pragma once"));
        assert!(boilerplate.header_includes.contains("namespace protocol::codec {"));
        assert!(boilerplate.source_header.contains("#include \"codecs.h\""));
        assert_eq!(boilerplate.footer, "} // namespace protocol::codec\n");
    }

    #[test]
    fn per_artifact_layout_has_no_boilerplate() {
        let boilerplate = Boilerplate::builtin(OutputLayout::PerArtifact { extension: "java" }, "x");
        assert_eq!(boilerplate, Boilerplate::default());
    }

    #[test]
    fn override_files_replace_only_what_they_provide() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(FOOTER_FILE), "// end\n").unwrap();

        let boilerplate = Boilerplate::load(CPP, "protocol::codec", Some(dir.path())).unwrap();

        assert_eq!(boilerplate.footer, "// end\n");
        assert!(boilerplate.header_includes.contains("#pragma once"));
    }
}
