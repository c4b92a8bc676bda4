//! Notification text rendering. Pure functions, no store or clock access.

use chrono::{Duration, NaiveDate};

use planner_store::{DueReminder, WeeklyTask};

/// Reminder for a dated task crossing the `lead_min` horizon.
pub fn reminder(item: &DueReminder, lead_min: u32) -> String {
    format!(
        "🔔 Reminder, {}!\nIn {} minutes:\n📝 {}\n🕐 {}\n📅 {}",
        item.owner_name,
        lead_min,
        item.task.text,
        item.task.time.format("%H:%M"),
        item.task.date.format("%d.%m.%Y"),
    )
}

/// `DD.MM - DD.MM.YYYY` label for the week starting at `week_start`.
pub fn week_label(week_start: NaiveDate) -> String {
    let week_end = week_start + Duration::days(6);
    format!(
        "{} - {}",
        week_start.format("%d.%m"),
        week_end.format("%d.%m.%Y")
    )
}

/// Daily digest of one owner's weekly tasks: done/pending lines plus a
/// progress footer, with a small celebration when everything is done.
pub fn digest(week_start: NaiveDate, tasks: &[WeeklyTask]) -> String {
    let mut out = format!("🗓 Tasks for the week ({}):\n\n", week_label(week_start));
    let mut done = 0;
    for task in tasks {
        if task.completed {
            done += 1;
            out.push_str(&format!("✅ {}\n", task.text));
        } else {
            out.push_str(&format!("📝 {}\n", task.text));
        }
    }
    out.push_str(&format!("\n📊 Progress: {done}/{} done", tasks.len()));
    if !tasks.is_empty() && done == tasks.len() {
        out.push_str("\n\n🎉 All tasks done. Great work!");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveTime};

    use planner_store::DatedTask;

    fn item() -> DueReminder {
        DueReminder {
            task: DatedTask {
                id: 1,
                owner: 42,
                text: "Call Alice".into(),
                date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                created_at: Local::now().naive_local(),
                reminded: false,
            },
            owner_name: "Bob".into(),
        }
    }

    #[test]
    fn reminder_includes_all_details() {
        let text = reminder(&item(), 15);
        assert!(text.contains("Bob"));
        assert!(text.contains("In 15 minutes"));
        assert!(text.contains("Call Alice"));
        assert!(text.contains("09:00"));
        assert!(text.contains("10.06.2024"));
    }

    #[test]
    fn week_label_spans_monday_to_sunday() {
        let label = week_label(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(label, "10.06 - 16.06.2024");
    }

    fn weekly(text: &str, completed: bool) -> WeeklyTask {
        WeeklyTask {
            id: 1,
            owner: 42,
            text: text.into(),
            week_start: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            completed,
            created_at: Local::now().naive_local(),
        }
    }

    #[test]
    fn digest_counts_progress() {
        let tasks = vec![weekly("laundry", true), weekly("groceries", false)];
        let text = digest(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), &tasks);
        assert!(text.contains("✅ laundry"));
        assert!(text.contains("📝 groceries"));
        assert!(text.contains("Progress: 1/2 done"));
        assert!(!text.contains("🎉"));
    }

    #[test]
    fn digest_celebrates_a_clean_sweep() {
        let tasks = vec![weekly("laundry", true)];
        let text = digest(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), &tasks);
        assert!(text.contains("Progress: 1/1 done"));
        assert!(text.contains("🎉"));
    }
}
