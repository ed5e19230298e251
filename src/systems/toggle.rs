use bevy_ecs::prelude::*;

use crate::systems::expansion::{
    ExpansionEvent, ExpansionEventLog, ExpansionStore, PendingPrefWrites, PrefWrite,
};

/// Setup commands fed into the ECS each tick.
#[derive(Debug, Clone)]
pub enum SetupIntent {
    ToggleExpansion { code: String },
}

/// Resource storing the intents for the next tick.
#[derive(Resource, Default, Debug)]
pub struct IntentQueue(pub Vec<SetupIntent>);

/// Decide which event, if any, a toggle request for `code` should emit.
/// Unknown and base codes emit nothing; otherwise the current flag is
/// inverted. Exactly one event per togglable request.
pub fn decide_toggle(store: &ExpansionStore, code: &str) -> Option<ExpansionEvent> {
    let expansion = store.get(code)?;
    if expansion.base {
        return None;
    }
    Some(if expansion.enabled {
        ExpansionEvent::Disabled {
            code: code.to_string(),
        }
    } else {
        ExpansionEvent::Enabled {
            code: code.to_string(),
        }
    })
}

/// Sole producer of expansion events. Applies each accepted toggle to the
/// expansion store, queues the owed preference write, and publishes the
/// event for the sync systems running later in the same tick.
pub fn toggle_intake_system(
    intents: Res<IntentQueue>,
    mut expansions: ResMut<ExpansionStore>,
    mut events: ResMut<ExpansionEventLog>,
    mut writes: ResMut<PendingPrefWrites>,
) {
    events.0.clear();

    for intent in intents.0.iter() {
        let SetupIntent::ToggleExpansion { code } = intent;

        let Some(event) = decide_toggle(&expansions, code) else {
            continue;
        };

        let persisted = match &event {
            ExpansionEvent::Enabled { code } => expansions.enable(code),
            ExpansionEvent::Disabled { code } => expansions.disable(code),
        };
        if persisted {
            writes.0.push(PrefWrite {
                code: event.code().to_string(),
                enabled: matches!(event, ExpansionEvent::Enabled { .. }),
            });
        }
        events.0.push(event);
    }
}
