use tracing::{debug, warn};

use crate::model::{Dimension, FacetConfig, Intent, Selection, ViewState};
use crate::normalize;

/// Applies one intent to a snapshot and returns the next snapshot.
pub fn reduce(state: &ViewState, intent: &Intent, config: &FacetConfig) -> ViewState {
    let mut next = state.clone();
    match intent {
        Intent::Toggle { dimension, value } => {
            let value = normalize::key(value);
            if value.is_empty() {
                return next;
            }
            if config.is_derived(*dimension) {
                let on = !next.selection.group_selected(&value);
                set_group(&mut next.selection, config, value, on);
            } else if !next.selection.remove(*dimension, &value) {
                next.selection.insert(*dimension, value);
            }
        }
        Intent::Select { dimension, value } => {
            let value = normalize::key(value);
            if value.is_empty() {
                return next;
            }
            if config.is_derived(*dimension) {
                set_group(&mut next.selection, config, value, true);
            } else {
                next.selection.insert(*dimension, value);
            }
        }
        Intent::Remove { dimension, value } => {
            let value = normalize::key(value);
            if config.is_derived(*dimension) {
                if next.selection.group_selected(&value) {
                    set_group(&mut next.selection, config, value, false);
                }
            } else {
                next.selection.remove(*dimension, &value);
            }
        }
        Intent::SetSort(mode) => next.sort = *mode,
        Intent::ClearAll => next.selection = Selection::new(),
    }
    debug!(
        "intent applied - {:?} -> {} selected, sort={}",
        intent,
        next.selection.len(),
        next.sort.label()
    );
    next
}

/// Cascades a parent value onto its member values in the child dimension.
fn set_group(selection: &mut Selection, config: &FacetConfig, value: String, on: bool) {
    let Some(grouping) = config.grouping.as_ref() else {
        return;
    };
    let Some(members) = grouping.members(&value) else {
        warn!(
            "'{}' is not a configured {} group, ignoring",
            value,
            grouping.parent.key()
        );
        return;
    };
    let child: Dimension = grouping.child;
    let members: Vec<String> = members
        .iter()
        .map(|m| normalize::key(m))
        .filter(|m| !m.is_empty())
        .collect();
    if on {
        for m in members {
            selection.insert(child, m);
        }
        selection.insert_group(value);
    } else {
        for m in members.iter() {
            selection.remove(child, m);
        }
        selection.remove_group(&value);
    }
}
