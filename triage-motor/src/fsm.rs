use database_layer::{OccurrenceStatus, OutcomeKind};

/// Validates a status transition against the occurrence state machine
/// (§4.2): `PENDENTE -> EM_ANDAMENTO -> {ACEITA, RECUSADA, CANCELADA}`,
/// `{ACEITA, RECUSADA} -> CONCLUIDA` on outcome record (§6: outcome
/// recording is "only from ACEITA/RECUSADA"), `CANCELADA`/`CONCLUIDA`
/// terminal. Pure and side-effect free; `OccurrenceRepository::transition_status`
/// is the one place that persists a transition, rejecting terminal states
/// of its own accord, but callers validate here first so a bad request can
/// be rejected with a clear error before a database round trip.
pub fn validate_transition(from: OccurrenceStatus, to: OccurrenceStatus, outcome: Option<OutcomeKind>) -> bool {
    use OccurrenceStatus::*;

    if from.is_terminal() {
        return false;
    }

    match (from, to) {
        (Pendente, EmAndamento) => true,
        (Pendente, Cancelada) => true,
        (EmAndamento, Aceita) => true,
        (EmAndamento, Recusada) => true,
        (EmAndamento, Cancelada) => true,
        (Aceita, Concluida) => outcome.is_some(),
        (Recusada, Concluida) => outcome.is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OccurrenceStatus::*;

    #[test]
    fn pendente_can_move_to_em_andamento() {
        assert!(validate_transition(Pendente, EmAndamento, None));
    }

    #[test]
    fn the_sweeper_can_cancel_a_pendente_occurrence_directly() {
        assert!(validate_transition(Pendente, Cancelada, None));
    }

    #[test]
    fn em_andamento_can_resolve_to_any_of_the_three_outcomes() {
        assert!(validate_transition(EmAndamento, Aceita, None));
        assert!(validate_transition(EmAndamento, Recusada, None));
        assert!(validate_transition(EmAndamento, Cancelada, None));
    }

    #[test]
    fn aceita_requires_an_outcome_to_reach_concluida() {
        assert!(!validate_transition(Aceita, Concluida, None));
        assert!(validate_transition(Aceita, Concluida, Some(OutcomeKind::Doado)));
    }

    #[test]
    fn recusada_also_requires_an_outcome_to_reach_concluida() {
        assert!(!validate_transition(Recusada, Concluida, None));
        assert!(validate_transition(Recusada, Concluida, Some(OutcomeKind::Recusado)));
    }

    #[test]
    fn terminal_statuses_never_transition_again() {
        assert!(!validate_transition(Cancelada, Pendente, None));
        assert!(!validate_transition(Concluida, Aceita, Some(OutcomeKind::Doado)));
    }

    #[test]
    fn pendente_cannot_skip_straight_to_aceita() {
        assert!(!validate_transition(Pendente, Aceita, None));
    }
}
