//! End-to-end runs over a small protocol directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use codecgen::{
    CodecGenError, GeneratorConfig, Language, LanguageRegistry, Pipeline, RunOptions, RunSummary,
    SchemaSource,
};
use tempfile::TempDir;

const MAP: &str = r#"
id: 1
name: map
methods:
  - id: 1
    name: put
    since: "2.0"
    doc: Puts an entry into this map.
    request:
      fields:
        - name: key
          type: String
        - name: value
          type: String
        - name: ttl
          type: Int64
    response:
      fields:
        - name: previous
          type: String
          nullable: true
    events:
      - name: entry
        fields:
          - name: key
            type: String
  - id: 2
    name: getAll
    request:
      fields:
        - name: keys
          type: ListCN_String
    response:
      fields:
        - name: values
          type: List_String
customTypes:
  - name: Address
    params:
      - name: host
        type: String
      - name: port
        type: Int32
"#;

const QUEUE: &str = r#"
id: 2
name: queue
methods:
  - id: 1
    name: offer
    request:
      fields:
        - name: value
          type: String
        - name: timeout
          type: Int64
    response:
      fields:
        - name: accepted
          type: Boolean
  - id: 2
    name: drain
    request:
      fields:
        - name: sizes
          type: List_Int16
    response:
      fields: []
"#;

fn protocol_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("map.yaml"), MAP).unwrap();
    fs::write(dir.path().join("queue.yaml"), QUEUE).unwrap();
    dir
}

fn run(protocol: &Path, output: &Path, config: GeneratorConfig) -> Result<RunSummary, CodecGenError> {
    Pipeline::new(config, LanguageRegistry::builtin()).run(&RunOptions {
        protocol_dir: protocol.to_path_buf(),
        schema: SchemaSource::Builtin,
        output_root: output.to_path_buf(),
        languages: Vec::new(),
    })
}

/// Every file under `root`, keyed by its relative path.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, fs::read(&path).unwrap());
            }
        }
    }
    files
}

#[test]
fn java_codecs_carry_derived_message_ids() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    run(protocol.path(), output.path(), GeneratorConfig::default()).unwrap();

    let text = fs::read_to_string(output.path().join("java/codec/MapPutCodec.java")).unwrap();
    assert!(text.contains("//hex: 0x010100"));
    assert!(text.contains("public static final int REQUEST_MESSAGE_TYPE = 65792;"));
    assert!(text.contains("//hex: 0x010101"));
    assert!(text.contains("public static final int RESPONSE_MESSAGE_TYPE = 65793;"));
    assert!(text.contains("//hex: 0x010102"));
    assert!(!text.contains("!codec_hash!"));
}

#[test]
fn fingerprints_replace_the_placeholder() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    run(protocol.path(), output.path(), GeneratorConfig::default()).unwrap();

    for (path, bytes) in snapshot(output.path()) {
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("!codec_hash!"), "placeholder left in {}", path.display());
    }

    let java = fs::read_to_string(output.path().join("java/codec/QueueOfferCodec.java")).unwrap();
    let line = java.lines().find(|line| line.starts_with("@Generated(")).unwrap();
    let digest = line.trim_start_matches("@Generated(\"").trim_end_matches("\")");
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let protocol = protocol_dir();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    run(protocol.path(), first.path(), GeneratorConfig::default()).unwrap();
    run(protocol.path(), second.path(), GeneratorConfig::default()).unwrap();
    let before = snapshot(first.path());
    assert_eq!(before, snapshot(second.path()));

    // Regenerating in place replaces rather than appends.
    run(protocol.path(), first.path(), GeneratorConfig::default()).unwrap();
    assert_eq!(before, snapshot(first.path()));
}

#[test]
fn missing_mappings_skip_only_the_affected_artifact() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    let summary = run(protocol.path(), output.path(), GeneratorConfig::default()).unwrap();

    // Java has no list codec for Int16.
    let java = output.path().join("java/codec");
    assert!(java.join("MapPutCodec.java").is_file());
    assert!(java.join("MapGetAllCodec.java").is_file());
    assert!(java.join("QueueOfferCodec.java").is_file());
    assert!(!java.join("QueueDrainCodec.java").exists());

    // C++ has no mapping for lists with nullable elements.
    let header = fs::read_to_string(output.path().join("cpp/codec/codecs.h")).unwrap();
    let source = fs::read_to_string(output.path().join("cpp/codec/codecs.cpp")).unwrap();
    assert!(header.contains("map_put_codec"));
    assert!(header.contains("queue_drain_codec"));
    assert!(!header.contains("map_get_all_codec"));
    assert!(!source.contains("map_get_all_codec"));
    assert!(header.ends_with("} // namespace protocol::codec\n"));

    assert_eq!(summary.artifacts_skipped(), 2);
    let skipped: Vec<_> = summary
        .languages
        .iter()
        .flat_map(|l| l.standard.skipped.iter().map(move |s| (l.language, s.artifact.clone())))
        .collect();
    assert!(skipped.contains(&(Language::Java, "queue.drain".to_string())));
    assert!(skipped.contains(&(Language::Cpp, "map.getAll".to_string())));
}

#[test]
fn custom_codecs_are_written_for_every_language() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    run(protocol.path(), output.path(), GeneratorConfig::default()).unwrap();

    assert!(output.path().join("java/codec/custom/AddressCodec.java").is_file());
    assert!(output.path().join("cpp/codec/address_codec.h").is_file());
    assert!(output.path().join("cpp/codec/address_codec.cpp").is_file());
}

#[test]
fn ignored_services_keep_their_custom_codecs() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();
    let config = GeneratorConfig::from_yaml_str(
        r#"
languages:
  java:
    ignore_services: [1]
"#,
    )
    .unwrap();

    run(protocol.path(), output.path(), config).unwrap();

    let java = output.path().join("java/codec");
    assert!(!java.join("MapPutCodec.java").exists());
    assert!(!java.join("MapGetAllCodec.java").exists());
    assert!(java.join("QueueOfferCodec.java").is_file());
    assert!(java.join("custom/AddressCodec.java").is_file());

    let header = fs::read_to_string(output.path().join("cpp/codec/codecs.h")).unwrap();
    assert!(header.contains("map_put_codec"));
}

#[test]
fn invalid_documents_stop_the_run_before_output() {
    let protocol = protocol_dir();
    fs::write(protocol.path().join("broken.yaml"), "id: 300\nname: broken\n").unwrap();
    let output = TempDir::new().unwrap();
    let root = output.path().join("generated");

    let err = run(protocol.path(), &root, GeneratorConfig::default()).unwrap_err();

    assert!(matches!(err, CodecGenError::ValidationFailed { failures: 1 }));
    assert!(!root.exists());
}

#[test]
fn enum_fields_render_at_the_same_offset_in_every_language() {
    let protocol = TempDir::new().unwrap();
    fs::write(
        protocol.path().join("cache.yaml"),
        r#"
id: 3
name: cache
methods:
  - id: 1
    name: listen
    request:
      fields:
        - name: name
          type: String
        - name: kind
          type: Enum_Int32_CacheEventType
    response:
      fields: []
"#,
    )
    .unwrap();
    let output = TempDir::new().unwrap();

    let summary = run(protocol.path(), output.path(), GeneratorConfig::default()).unwrap();

    assert_eq!(summary.artifacts_skipped(), 0);
    let java = fs::read_to_string(output.path().join("java/codec/CacheListenCodec.java")).unwrap();
    assert!(java.contains("KIND_FIELD_OFFSET"));
    assert!(java.contains("kind.getId()"));

    let source = fs::read_to_string(output.path().join("cpp/codec/codecs.cpp")).unwrap();
    assert!(source.contains("msg.set(kind);"));
    assert!(source.contains("msg.set(name, true);"));
}

#[test]
fn a_single_language_can_be_selected() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    let summary = Pipeline::new(GeneratorConfig::default(), LanguageRegistry::builtin())
        .run(&RunOptions {
            protocol_dir: protocol.path().to_path_buf(),
            schema: SchemaSource::Builtin,
            output_root: output.path().to_path_buf(),
            languages: vec![Language::Java],
        })
        .unwrap();

    assert_eq!(summary.services, 2);
    assert_eq!(summary.languages.len(), 1);
    assert!(!output.path().join("cpp").exists());
}
