use crate::model::{CalendarDay, VacationId, VacationOrigin, VacationRecord};
use crate::storage::CalendarStore;
use tracing::error;

/// Convertit un jour travaillé en congé automatique.
///
/// La ligne et l'enregistrement de congé sont écrits ensemble : si le congé
/// ne peut être créé, la ligne est restaurée.
pub(super) fn convert_day<S: CalendarStore + ?Sized>(
    store: &mut S,
    day: CalendarDay,
) -> anyhow::Result<VacationRecord> {
    let original = day.clone();
    let mut day = day;
    let id = VacationId::automatic(&day.employee, day.date);
    let planned = day.convert_to_vacation(id.clone());
    let record = VacationRecord {
        id,
        employee: day.employee.clone(),
        date: day.date,
        shift: planned,
        group: day.group.clone(),
        area: day.area.clone(),
        origin: VacationOrigin::Automatic,
    };

    store.update_day(&day)?;
    if let Err(err) = store.insert_vacation(record.clone()) {
        if let Err(rollback) = store.update_day(&original) {
            error!(
                employee = %original.employee,
                date = %original.date,
                %rollback,
                "rollback of calendar day failed"
            );
        }
        return Err(err);
    }
    Ok(record)
}
