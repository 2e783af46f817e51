// Installing the global registry only works once per process, so this binary holds a single test.

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;
use truthlink::prelude::*;
use truthlink::{global_registry, init_global_registry, RegistryConfig, TruthLinkError};

#[test]
fn configured_registry_is_used_by_new_contexts() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "main": ["SimTruth", "TruthEvent"], "first_pileup": ["PileupTruth"] }}"#).unwrap();
    let config = RegistryConfig::from_json_file(file.path()).unwrap();
    init_global_registry(&config).unwrap();

    assert!(matches!(
        init_global_registry(&RegistryConfig::default()),
        Err(TruthLinkError::RegistryError(_))
    ));
    let registry = global_registry();
    assert_eq!(
        registry.candidate_keys(CollectionKind::FirstPileup),
        ["PileupTruth".to_string()]
    );

    let store = Arc::new(MemoryEventStore::new());
    let mut event = GenEvent::new(4);
    event.add_particle(GenParticle::new(8, 2212, 4, [0.0, 0.0, 6500.0, 6500.0]));
    store.record("PileupTruth", [event].into_iter().collect());
    let context = EventContext::new(store);

    let link = ParticleLink::with_collection_name(8, EventLocator::Position(0), "PileupTruth", &context);
    assert_eq!(link.collection_kind(), CollectionKind::FirstPileup);
    assert_eq!(link.cptr().map(|p| p.pdg_id), Some(2212));
    assert_eq!(link.event_index(), (Some(4), None));
}
