use std::collections::HashMap;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;

use crate::data::catalog::{ContentCatalog, FactionDef, ItemDef, MapDef};
use crate::systems::expansion::{ExpansionEventLog, ExpansionStore, PendingPrefWrites};
use crate::systems::sync::{expansion_sync_system, Catalog, ComponentStore, ExpansionComponent};
use crate::systems::toggle::{toggle_intake_system, IntentQueue};

/// Canonical tick ordering: intent intake runs strictly before every
/// component store syncs against the resulting events.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Intake,
    Sync,
    Cleanup,
}

/// Build the ECS world with the catalog, the expansion store, and one
/// seeded component store per kind. Registering a new kind is one
/// `seed_store` call here and one sync system in `create_schedule`.
pub fn create_world(catalog: ContentCatalog, restored: &HashMap<String, bool>) -> World {
    let mut world = World::new();

    let expansions = ExpansionStore::from_catalog(&catalog, restored);
    seed_store::<FactionDef>(&mut world, &catalog, &expansions);
    seed_store::<ItemDef>(&mut world, &catalog, &expansions);
    seed_store::<MapDef>(&mut world, &catalog, &expansions);

    world.insert_resource(expansions);
    world.insert_resource(Catalog(catalog));
    world.insert_resource(IntentQueue::default());
    world.insert_resource(ExpansionEventLog::default());
    world.insert_resource(PendingPrefWrites::default());
    world
}

/// Build the system schedule in the canonical order.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((TickSet::Intake, TickSet::Sync, TickSet::Cleanup).chain());

    schedule.add_systems((
        toggle_intake_system.in_set(TickSet::Intake),
        expansion_sync_system::<FactionDef>.in_set(TickSet::Sync),
        expansion_sync_system::<ItemDef>.in_set(TickSet::Sync),
        expansion_sync_system::<MapDef>.in_set(TickSet::Sync),
    ));

    schedule
}

fn seed_store<T: ExpansionComponent>(
    world: &mut World,
    catalog: &ContentCatalog,
    expansions: &ExpansionStore,
) {
    world.insert_resource(ComponentStore::<T>::seeded(catalog, expansions));
}
