// Authorization guard: who may invoke which transition in which state
//
// Pure functions of (actor, handover, action). Both `apply_transition` and
// `get_available_actions` go through `AuthorizationGuard::evaluate`.

use std::fmt;

use crate::handover::{
    Actor, HandoverAction, HandoverRequest, HandoverStatus, Role, WorkflowState,
};

/// Why a guard refused an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// Actor is not an administrator and none of the three parties
    NotAParty,
    WrongRole { required: Role, actual: Role },
    AlreadySigned { party: Role },
    NotYetSigned { party: Role },
    AlreadyApproved,
    AlreadyTakenOver,
    AlreadyTakenBack,
    StatusMismatch {
        expected: Vec<HandoverStatus>,
        actual: HandoverStatus,
    },
    TerminalState(HandoverStatus),
    /// Task updates are closed to non-administrators once a handover is rejected
    HandoverRejected,
}

fn party_label(role: Role) -> &'static str {
    match role {
        Role::Administrator => "an administrator",
        Role::HandingOver => "the handing-over party",
        Role::TakingOver => "the taking-over party",
        Role::LineManager => "the line manager",
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NotAParty => {
                write!(f, "actor is not a party to this handover")
            }
            DenialReason::WrongRole { required, actual } => write!(
                f,
                "only {} may do this, actor is {}",
                party_label(*required),
                party_label(*actual)
            ),
            DenialReason::AlreadySigned { party } => {
                write!(f, "already signed by {}", party_label(*party))
            }
            DenialReason::NotYetSigned { party } => {
                write!(f, "not yet signed by {}", party_label(*party))
            }
            DenialReason::AlreadyApproved => write!(f, "already approved by the line manager"),
            DenialReason::AlreadyTakenOver => write!(f, "responsibilities already taken over"),
            DenialReason::AlreadyTakenBack => write!(f, "responsibilities already taken back"),
            DenialReason::StatusMismatch { expected, actual } => {
                let expected: Vec<&str> = expected.iter().map(HandoverStatus::as_str).collect();
                write!(
                    f,
                    "status is {actual}, expected {}",
                    expected.join(" or ")
                )
            }
            DenialReason::TerminalState(status) => {
                write!(f, "handover is {status}, no further transitions are possible")
            }
            DenialReason::HandoverRejected => {
                write!(f, "handover was rejected, tasks can no longer be updated")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed { role: Role },
    Denied { reason: DenialReason },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed { .. })
    }

    pub fn reason(&self) -> String {
        match self {
            GuardDecision::Allowed { role } => format!("allowed as {role}"),
            GuardDecision::Denied { reason } => reason.to_string(),
        }
    }
}

impl From<Result<Role, DenialReason>> for GuardDecision {
    fn from(result: Result<Role, DenialReason>) -> Self {
        match result {
            Ok(role) => GuardDecision::Allowed { role },
            Err(reason) => GuardDecision::Denied { reason },
        }
    }
}

pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Administrator first, then the three parties in declaration order.
    pub fn resolve_role(actor: &Actor, handover: &HandoverRequest) -> Option<Role> {
        if actor.is_admin {
            Some(Role::Administrator)
        } else if actor.is(&handover.handing_over_employee) {
            Some(Role::HandingOver)
        } else if actor.is(&handover.taking_over_employee) {
            Some(Role::TakingOver)
        } else if actor.is(&handover.line_manager) {
            Some(Role::LineManager)
        } else {
            None
        }
    }

    pub fn evaluate(
        actor: &Actor,
        handover: &HandoverRequest,
        action: HandoverAction,
    ) -> GuardDecision {
        let decision = match Self::resolve_role(actor, handover) {
            None => Err(DenialReason::NotAParty),
            Some(Role::Administrator) => {
                Self::admin_guard(&handover.workflow, action).map(|_| Role::Administrator)
            }
            Some(role) => Self::party_guard(role, &handover.workflow, action).map(|_| role),
        };
        decision.into()
    }

    /// Task status changes: administrators always, the taking-over party
    /// unless the handover was rejected.
    pub fn can_update_tasks(actor: &Actor, handover: &HandoverRequest) -> GuardDecision {
        let decision = match Self::resolve_role(actor, handover) {
            None => Err(DenialReason::NotAParty),
            Some(Role::Administrator) => Ok(Role::Administrator),
            Some(Role::TakingOver) if handover.status() == HandoverStatus::Rejected => {
                Err(DenialReason::HandoverRejected)
            }
            Some(Role::TakingOver) => Ok(Role::TakingOver),
            Some(actual) => Err(DenialReason::WrongRole {
                required: Role::TakingOver,
                actual,
            }),
        };
        decision.into()
    }

    fn required_role(action: HandoverAction) -> Role {
        match action {
            HandoverAction::SignHo | HandoverAction::Resubmit | HandoverAction::Takeback => {
                Role::HandingOver
            }
            HandoverAction::SignTo | HandoverAction::Takeover => Role::TakingOver,
            HandoverAction::Approve | HandoverAction::Reject | HandoverAction::Clarify => {
                Role::LineManager
            }
        }
    }

    /// Administrator column: milestone booleans for the sign-off actions,
    /// exact status for the rest.
    fn admin_guard(state: &WorkflowState, action: HandoverAction) -> Result<(), DenialReason> {
        ensure_not_terminal(state)?;
        match action {
            HandoverAction::SignHo => ensure_unsigned(state.ho_signed, Role::HandingOver),
            HandoverAction::SignTo => {
                ensure_signed(state.ho_signed, Role::HandingOver)?;
                ensure_unsigned(state.to_signed, Role::TakingOver)
            }
            HandoverAction::Approve | HandoverAction::Reject | HandoverAction::Clarify => {
                ensure_signed(state.ho_signed, Role::HandingOver)?;
                ensure_signed(state.to_signed, Role::TakingOver)?;
                ensure_not_approved(state)?;
                ensure_line_manager_turn(state)
            }
            HandoverAction::Resubmit => ensure_status(state, HandoverStatus::NeedClarification),
            HandoverAction::Takeover => {
                ensure_status(state, HandoverStatus::ApprovedByLineManager)?;
                ensure_not_taken_over(state)
            }
            HandoverAction::Takeback => {
                ensure_status(state, HandoverStatus::TakenOver)?;
                ensure_not_taken_back(state)
            }
        }
    }

    /// Party column: role identity plus exact status sequencing.
    fn party_guard(
        role: Role,
        state: &WorkflowState,
        action: HandoverAction,
    ) -> Result<(), DenialReason> {
        let required = Self::required_role(action);
        if role != required {
            return Err(DenialReason::WrongRole {
                required,
                actual: role,
            });
        }
        ensure_not_terminal(state)?;
        match action {
            HandoverAction::SignHo => {
                ensure_unsigned(state.ho_signed, Role::HandingOver)?;
                ensure_status(state, HandoverStatus::Created)
            }
            HandoverAction::SignTo => {
                ensure_unsigned(state.to_signed, Role::TakingOver)?;
                ensure_status(state, HandoverStatus::SignedByHandingOver)
            }
            HandoverAction::Approve | HandoverAction::Reject | HandoverAction::Clarify => {
                ensure_not_approved(state)?;
                ensure_line_manager_turn(state)
            }
            HandoverAction::Resubmit => ensure_status(state, HandoverStatus::NeedClarification),
            HandoverAction::Takeover => {
                ensure_not_taken_over(state)?;
                ensure_status(state, HandoverStatus::ApprovedByLineManager)
            }
            HandoverAction::Takeback => {
                ensure_not_taken_back(state)?;
                ensure_status(state, HandoverStatus::TakenOver)
            }
        }
    }
}

fn ensure_not_terminal(state: &WorkflowState) -> Result<(), DenialReason> {
    if state.status.is_terminal() {
        return Err(DenialReason::TerminalState(state.status));
    }
    Ok(())
}

fn ensure_unsigned(signed: bool, party: Role) -> Result<(), DenialReason> {
    if signed {
        return Err(DenialReason::AlreadySigned { party });
    }
    Ok(())
}

fn ensure_signed(signed: bool, party: Role) -> Result<(), DenialReason> {
    if !signed {
        return Err(DenialReason::NotYetSigned { party });
    }
    Ok(())
}

fn ensure_not_approved(state: &WorkflowState) -> Result<(), DenialReason> {
    if state.lm_approved {
        return Err(DenialReason::AlreadyApproved);
    }
    Ok(())
}

fn ensure_not_taken_over(state: &WorkflowState) -> Result<(), DenialReason> {
    if state.taken_over {
        return Err(DenialReason::AlreadyTakenOver);
    }
    Ok(())
}

fn ensure_not_taken_back(state: &WorkflowState) -> Result<(), DenialReason> {
    if state.taken_back {
        return Err(DenialReason::AlreadyTakenBack);
    }
    Ok(())
}

fn ensure_status(state: &WorkflowState, expected: HandoverStatus) -> Result<(), DenialReason> {
    if state.status != expected {
        return Err(DenialReason::StatusMismatch {
            expected: vec![expected],
            actual: state.status,
        });
    }
    Ok(())
}

fn ensure_line_manager_turn(state: &WorkflowState) -> Result<(), DenialReason> {
    if !state.status.awaits_line_manager() {
        return Err(DenialReason::StatusMismatch {
            expected: vec![
                HandoverStatus::SignedByTakingOver,
                HandoverStatus::Resubmitted,
            ],
            actual: state.status,
        });
    }
    Ok(())
}
