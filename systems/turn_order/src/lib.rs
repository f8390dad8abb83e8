#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Initiative-ordered turn sequencing.
//!
//! The scheduler is the only stateful component of the battle grid engine.
//! Its state lives in a [`TurnRecord`] value and every operation is a pure
//! transition from one record to the next, so an encounter can be replayed by
//! feeding the same [`TurnCommand`]s through [`apply`].

use battle_grid_core::{
    ActionId, CombatAction, CombatantId, CombatantSnapshot, CombatantView, TurnPhase,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Snapshot of the encounter's turn state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    order: Vec<CombatantId>,
    round: u32,
    current: Option<CombatantId>,
    phase: TurnPhase,
    actions: Vec<CombatAction>,
}

impl TurnRecord {
    /// Initiative order, first actor first.
    #[must_use]
    pub fn order(&self) -> &[CombatantId] {
        &self.order
    }

    /// Current round, starting at one.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Combatant whose turn it is, if combat has started.
    #[must_use]
    pub const fn current(&self) -> Option<CombatantId> {
        self.current
    }

    /// Phase of the active turn.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Actions taken during the active turn, oldest first.
    #[must_use]
    pub fn actions(&self) -> &[CombatAction] {
        &self.actions
    }

    /// Reports whether it is the provided combatant's turn.
    #[must_use]
    pub fn is_current_turn(&self, combatant: CombatantId) -> bool {
        self.current == Some(combatant)
    }
}

impl Default for TurnRecord {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            round: 1,
            current: None,
            phase: TurnPhase::Planning,
            actions: Vec::new(),
        }
    }
}

/// Result of handing the turn to the next combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceOutcome {
    /// The turn passed to a living combatant.
    Advanced {
        /// Combatant whose turn ended.
        previous: CombatantId,
        /// Combatant whose turn begins.
        next: CombatantId,
        /// Whether the order wrapped and a new round began.
        new_round: bool,
    },
    /// Nobody in the order is alive; the record is unchanged.
    NoLivingCombatant,
    /// Combat has not been initialised; the record is unchanged.
    NotInitialized,
}

/// Reason an action could not be added to the turn log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActionRejection {
    /// No turn is in progress.
    #[error("no turn is in progress")]
    NoActiveTurn,
    /// The action belongs to someone other than the current actor.
    #[error("it is {current}'s turn, not {actor}'s")]
    NotCurrentActor {
        /// Actor named by the rejected action.
        actor: CombatantId,
        /// Combatant whose turn it is.
        current: CombatantId,
    },
}

/// Starts combat: orders combatants by initiative and hands the first turn out.
///
/// Ties on initiative go to the higher initiative modifier, then to whoever
/// was listed first. Duplicate identifiers keep their first position.
#[must_use]
pub fn initialize(combatants: &[CombatantSnapshot]) -> TurnRecord {
    let mut ranked: Vec<&CombatantSnapshot> = combatants.iter().collect();
    ranked.sort_by(|a, b| {
        b.initiative
            .cmp(&a.initiative)
            .then(b.initiative_modifier.cmp(&a.initiative_modifier))
    });

    let mut order: Vec<CombatantId> = Vec::with_capacity(ranked.len());
    for combatant in ranked {
        if !order.contains(&combatant.id) {
            order.push(combatant.id);
        }
    }

    TurnRecord {
        current: order.first().copied(),
        order,
        round: 1,
        phase: TurnPhase::Action,
        actions: Vec::new(),
    }
}

/// Hands the turn to the next living combatant in initiative order.
///
/// The scan starts after the current actor and wraps around, ending on the
/// current actor itself. Landing at or before the current actor's slot starts
/// a new round. Combatants missing from the view count as dead.
#[must_use]
pub fn advance(record: &TurnRecord, combatants: &CombatantView) -> (TurnRecord, AdvanceOutcome) {
    let Some(previous) = record.current else {
        return (record.clone(), AdvanceOutcome::NotInitialized);
    };
    let Some(current_index) = record.order.iter().position(|id| *id == previous) else {
        return (record.clone(), AdvanceOutcome::NotInitialized);
    };

    let len = record.order.len();
    let next_index = (1..=len)
        .map(|offset| (current_index + offset) % len)
        .find(|index| {
            record
                .order
                .get(*index)
                .is_some_and(|id| combatants.is_alive(*id))
        });
    let Some(next_index) = next_index else {
        debug!(round = record.round, "no living combatant can take a turn");
        return (record.clone(), AdvanceOutcome::NoLivingCombatant);
    };
    let Some(next) = record.order.get(next_index).copied() else {
        return (record.clone(), AdvanceOutcome::NoLivingCombatant);
    };

    let new_round = next_index <= current_index;
    let round = if new_round {
        let round = record.round.saturating_add(1);
        debug!(round, "round started");
        round
    } else {
        record.round
    };

    let advanced = TurnRecord {
        order: record.order.clone(),
        round,
        current: Some(next),
        phase: TurnPhase::Action,
        actions: Vec::new(),
    };
    (
        advanced,
        AdvanceOutcome::Advanced {
            previous,
            next,
            new_round,
        },
    )
}

/// Appends a combatant to the end of the order unless it is already present.
///
/// The current actor and round are left untouched.
#[must_use]
pub fn join(record: &TurnRecord, combatant: CombatantId) -> TurnRecord {
    let mut joined = record.clone();
    if !joined.order.contains(&combatant) {
        joined.order.push(combatant);
    }
    joined
}

/// Adds an action to the active turn's log.
pub fn record_action(
    record: &TurnRecord,
    action: CombatAction,
) -> Result<TurnRecord, ActionRejection> {
    let current = record.current.ok_or(ActionRejection::NoActiveTurn)?;
    if action.actor != current {
        return Err(ActionRejection::NotCurrentActor {
            actor: action.actor,
            current,
        });
    }

    let mut updated = record.clone();
    updated.actions.push(action);
    Ok(updated)
}

/// Returns the scheduler to its pre-combat state.
#[must_use]
pub fn reset() -> TurnRecord {
    TurnRecord::default()
}

/// Requests accepted by [`apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnCommand {
    /// Starts combat with the provided combatants.
    Initialize {
        /// Combatants taking part, with initiative already rolled.
        combatants: Vec<CombatantSnapshot>,
    },
    /// Ends the current turn.
    Advance,
    /// Adds a combatant to an ongoing combat.
    Join {
        /// Combatant joining the fight.
        combatant: CombatantId,
    },
    /// Logs an action for the current turn.
    RecordAction {
        /// Action taken.
        action: CombatAction,
    },
    /// Clears all turn state.
    Reset,
}

/// Notifications emitted by [`apply`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// Combat began with the provided initiative order.
    CombatStarted {
        /// Initiative order, first actor first.
        order: Vec<CombatantId>,
    },
    /// A new round began.
    RoundStarted {
        /// Round that began.
        round: u32,
    },
    /// A combatant's turn began.
    TurnStarted {
        /// Round the turn belongs to.
        round: u32,
        /// Combatant taking the turn.
        combatant: CombatantId,
    },
    /// The turn could not pass because nobody is alive.
    CombatStalled {
        /// Round in which the scheduler stalled.
        round: u32,
    },
    /// A combatant joined the initiative order.
    CombatantJoined {
        /// Combatant that joined.
        combatant: CombatantId,
    },
    /// An action was added to the turn log.
    ActionRecorded {
        /// Identifier of the recorded action.
        action: ActionId,
        /// Combatant that took the action.
        actor: CombatantId,
    },
    /// An action was refused.
    ActionRejected {
        /// Identifier of the refused action.
        action: ActionId,
        /// Reason for the refusal.
        reason: ActionRejection,
    },
}

/// Applies a command to the record, returning the next record.
pub fn apply(
    record: &TurnRecord,
    command: TurnCommand,
    combatants: &CombatantView,
    out_events: &mut Vec<TurnEvent>,
) -> TurnRecord {
    match command {
        TurnCommand::Initialize { combatants: roster } => {
            let started = initialize(&roster);
            out_events.push(TurnEvent::CombatStarted {
                order: started.order.clone(),
            });
            if let Some(combatant) = started.current {
                out_events.push(TurnEvent::TurnStarted {
                    round: started.round,
                    combatant,
                });
            }
            started
        }
        TurnCommand::Advance => {
            let (next_record, outcome) = advance(record, combatants);
            match outcome {
                AdvanceOutcome::Advanced {
                    next, new_round, ..
                } => {
                    if new_round {
                        out_events.push(TurnEvent::RoundStarted {
                            round: next_record.round,
                        });
                    }
                    out_events.push(TurnEvent::TurnStarted {
                        round: next_record.round,
                        combatant: next,
                    });
                }
                AdvanceOutcome::NoLivingCombatant => {
                    out_events.push(TurnEvent::CombatStalled {
                        round: record.round,
                    });
                }
                AdvanceOutcome::NotInitialized => {}
            }
            next_record
        }
        TurnCommand::Join { combatant } => {
            let joined = join(record, combatant);
            if joined.order.len() > record.order.len() {
                out_events.push(TurnEvent::CombatantJoined { combatant });
            }
            joined
        }
        TurnCommand::RecordAction { action } => {
            let (id, actor) = (action.id, action.actor);
            match record_action(record, action) {
                Ok(updated) => {
                    out_events.push(TurnEvent::ActionRecorded { action: id, actor });
                    updated
                }
                Err(reason) => {
                    out_events.push(TurnEvent::ActionRejected { action: id, reason });
                    record.clone()
                }
            }
        }
        TurnCommand::Reset => reset(),
    }
}
