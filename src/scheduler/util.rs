use chrono::NaiveDate;

/// Avance du curseur de jours après la marche d'un employé, en jours
/// calendaires.
///
/// `span` couvre tout ce qui a été parcouru, week-ends et jours refusés
/// compris : l'employé suivant démarre au lendemain du jour d'arrêt.
pub fn next_cursor_advance(span: usize, _assigned: u32) -> usize {
    span
}

/// Dernier offset valide de la fenêtre `[first, last]`.
pub(super) fn last_offset(first: NaiveDate, last: NaiveDate) -> usize {
    usize::try_from(last.signed_duration_since(first).num_days()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_past_stop_day() {
        assert_eq!(next_cursor_advance(0, 0), 0);
        // mercredi 8 .. mardi 14 janvier : 7 jours, dont un week-end
        assert_eq!(next_cursor_advance(7, 5), 7);
        assert_eq!(next_cursor_advance(12, 0), 12);
    }

    #[test]
    fn last_offset_of_window() {
        let first = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        assert_eq!(last_offset(first, last), 336);
        assert_eq!(last_offset(first, first), 0);
    }
}
