use envkit_core::{EnvError, EnvStore, MemoryEnv, ProcessEnv, Resolver};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn memory_resolver(vars: &[(&str, &str)]) -> (Arc<MemoryEnv>, Resolver) {
    let store = Arc::new(MemoryEnv::with_vars(vars.iter().copied()));
    let resolver = Resolver::builder()
        .silent(true)
        .store(store.clone())
        .build()
        .unwrap();
    (store, resolver)
}

#[test]
fn bool_spellings_resolve() {
    let spellings = [
        ("true", true),
        ("TRUE", true),
        ("1", true),
        ("yes", true),
        ("Y", true),
        ("false", false),
        ("FALSE", false),
        ("0", false),
        ("no", false),
        ("N", false),
    ];
    let (_, env) = memory_resolver(&[]);

    for (raw, expected) in spellings {
        env.set("FLAG", raw);
        assert_eq!(env.get_bool("FLAG", !expected), expected, "spelling {raw}");
    }

    env.set("FLAG", "sometimes");
    assert!(env.get_bool("FLAG", true));
    assert!(!env.get_bool("FLAG", false));
}

#[test]
fn bare_integer_duration_takes_unit_from_key() {
    let (_, env) = memory_resolver(&[]);
    let default = Duration::from_secs(99);

    for n in [0u64, 1, 17, 1500] {
        env.set("CONNECT_TIMEOUT_MS", &n.to_string());
        env.set("IDLE_TTL_MIN", &n.to_string());
        env.set("GRACE_PERIOD", &n.to_string());

        assert_eq!(env.get_duration("CONNECT_TIMEOUT_MS", default), Duration::from_millis(n));
        assert_eq!(env.get_duration("IDLE_TTL_MIN", default), Duration::from_secs(n * 60));
        assert_eq!(env.get_duration("GRACE_PERIOD", default), Duration::from_secs(n));
    }
}

#[test]
fn explicit_duration_unit_ignores_key() {
    let (_, env) = memory_resolver(&[("FLUSH_MS", "30s"), ("FLUSH_MIN", "30s"), ("FLUSH", "30s")]);

    for key in ["FLUSH_MS", "FLUSH_MIN", "FLUSH"] {
        assert_eq!(env.get_duration(key, Duration::ZERO), Duration::from_secs(30));
    }
}

#[test]
fn set_then_get_roundtrip() {
    let (store, env) = memory_resolver(&[]);

    env.set("GREETING", "hello world");
    assert_eq!(env.get_string("GREETING", ""), "hello world");
    assert_eq!(store.get("GREETING"), Some("hello world".to_string()));
}

#[test]
fn unset_key_is_idempotent_and_not_cached() {
    let (_, env) = memory_resolver(&[]);

    assert_eq!(env.get_string("ABSENT", "dflt"), "dflt");
    assert_eq!(env.get_string("ABSENT", "dflt"), "dflt");
    assert_eq!(env.cache_len(), 0);
}

#[test]
fn slices_trim_and_drop() {
    let (_, env) = memory_resolver(&[("NAMES", "a, b , c"), ("IDS", "1,invalid,3"), ("EMPTY", "")]);

    assert_eq!(env.get_string_slice("NAMES", &[]), vec!["a", "b", "c"]);
    assert_eq!(env.get_int_slice("IDS", &[]), vec![1, 3]);
    assert_eq!(env.get_string_slice("EMPTY", &["d"]), vec!["d"]);
    assert_eq!(env.get_int_slice("EMPTY", &[9]), vec![9]);
}

#[test]
fn construction_reports_exactly_the_missing_key() {
    let store = Arc::new(MemoryEnv::with_vars([("SVC_HOST", "h"), ("SVC_PORT", "1")]));

    let err = Resolver::builder()
        .prefix("SVC_")
        .required(["HOST", "PORT", "TOKEN"])
        .store(store)
        .build()
        .unwrap_err();

    match err {
        EnvError::MissingRequired { keys } => assert_eq!(keys, vec!["SVC_TOKEN".to_string()]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn env_file_loads_before_required_check() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# service settings").unwrap();
    writeln!(file, "SVC_TOKEN=\"s3cr3t\"").unwrap();
    writeln!(file, "SVC_HOST=from-file").unwrap();

    let store = Arc::new(MemoryEnv::with_vars([("SVC_HOST", "from-env")]));
    let env = Resolver::builder()
        .prefix("SVC_")
        .env_file(file.path())
        .required(["HOST", "TOKEN"])
        .store(store)
        .build()
        .unwrap();

    assert_eq!(env.get_string("TOKEN", ""), "s3cr3t");
    assert_eq!(env.get_string("HOST", ""), "from-env");
}

#[test]
fn missing_env_file_does_not_fail_construction() {
    let dir = tempfile::tempdir().unwrap();
    let env = Resolver::builder()
        .silent(true)
        .env_file(dir.path().join("absent.env"))
        .store(Arc::new(MemoryEnv::new()))
        .build();

    assert!(env.is_ok());
}

#[test]
fn live_process_environment_wins_over_file() {
    let process = ProcessEnv::new();
    process.set("ENVKIT_IT_FOO", "baz");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ENVKIT_IT_FOO=bar").unwrap();

    let env = Resolver::builder()
        .prefix("ENVKIT_IT_")
        .env_file(file.path())
        .build()
        .unwrap();

    assert_eq!(env.get_string("FOO", ""), "baz");
    process.unset("ENVKIT_IT_FOO");
}

#[test]
fn presence_not_validity_is_checked() {
    let store = Arc::new(MemoryEnv::with_vars([("PORT", "not-a-port")]));
    let env = Resolver::builder()
        .silent(true)
        .required(["PORT"])
        .store(store)
        .build()
        .unwrap();

    assert_eq!(env.get_int("PORT", 8080), 8080);
    assert!(env.require::<u16>("PORT").is_err());
}
