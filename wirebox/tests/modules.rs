use std::sync::Arc;

use wirebox::Injectable;
use wirebox::prelude::*;

trait Repository: Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Injectable)]
#[injectable(capability = "dyn Repository")]
struct MemoryRepository;

impl Repository for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Injectable)]
#[injectable(capability = "dyn Repository")]
struct SqlRepository {
    #[inject(value = "databaseUrl")]
    url: String,
}

impl Repository for SqlRepository {
    fn name(&self) -> &'static str {
        "sql"
    }
}

#[derive(Injectable)]
struct Service {
    repository: Arc<dyn Repository>,
}

struct StorageModule;

impl Module for StorageModule {
    fn register(&self, container: &mut Container) -> Result<()> {
        container
            .register_value("databaseUrl", String::from("postgres://localhost/app"))?
            .register_definitions([MemoryRepository::definition(), SqlRepository::definition()])?;
        Ok(())
    }
}

struct AppModule;

impl Module for AppModule {
    fn register(&self, container: &mut Container) -> Result<()> {
        container.register::<Service>()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "app"
    }
}

fn installed(settings: WiringSettings) -> Container {
    let mut container = Container::with_settings(settings);
    container.install(&StorageModule).unwrap().install(&AppModule).unwrap();
    container
}

#[test]
fn later_provider_wins_by_default() {
    let store = installed(WiringSettings::default()).build().unwrap();

    assert_eq!(store.provider_of::<dyn Repository>(), Some(TypeKey::of::<SqlRepository>()));
    assert_eq!(store.resolve::<Service>().unwrap().repository.name(), "sql");
    assert_eq!(store.capability_count(), 1);
    assert_eq!(store.get::<SqlRepository>().unwrap().url, "postgres://localhost/app");
}

#[test]
fn rejecting_settings_fail_the_build() {
    let settings: WiringSettings =
        serde_json::from_str(r#"{ "capability_conflicts": "reject" }"#).unwrap();

    match installed(settings).build() {
        Err(WireboxError::CapabilityConflict(err)) => {
            assert_eq!(err.capability, TypeKey::of::<dyn Repository>());
            assert_eq!(err.existing, TypeKey::of::<MemoryRepository>());
            assert_eq!(err.incoming, TypeKey::of::<SqlRepository>());
        }
        other => panic!("Expected CapabilityConflict, got: {other:?}"),
    }
}

#[test]
fn failing_module_stops_installation() {
    struct Broken;

    impl Module for Broken {
        fn register(&self, container: &mut Container) -> Result<()> {
            container.register_value("databaseUrl", 1u8)?;
            Ok(())
        }
    }

    let mut container = Container::new();
    container.install(&StorageModule).unwrap();

    let err = container.install(&Broken).unwrap_err();
    assert!(matches!(err, WireboxError::AmbiguousValueName(_)));
    assert_eq!(container.value_count(), 1);
}
