//! CSV export of task snapshots.

use crate::task::TaskView;

/// Header row, matching the JSON field names.
pub const CSV_HEADER: &str = "id,title,due,completed,priority,daysLeft,tags";

/// Quote a field if it contains a comma, double quote or LF.
///
/// Embedded double quotes are doubled. CR alone does not trigger quoting.
pub fn csv_escape(field: &str) -> String {
    let doubled = field.replace('"', "\"\"");
    if doubled.contains(',') || doubled.contains('"') || doubled.contains('\n') {
        format!("\"{doubled}\"")
    } else {
        doubled
    }
}

/// Render tasks as CSV with LF line endings, one line per task in the
/// given order.
pub fn tasks_to_csv(tasks: &[TaskView]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for task in tasks {
        let fields = [
            csv_escape(&task.id),
            csv_escape(&task.title),
            csv_escape(&task.due),
            task.completed.to_string(),
            task.priority.to_string(),
            task.days_left.to_string(),
            csv_escape(&task.tags),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn view(title: &str, tags: &str) -> TaskView {
        TaskView {
            id: "t1".to_string(),
            title: title.to_string(),
            due: "2024-06-03".to_string(),
            completed: false,
            priority: Priority::High,
            days_left: 2,
            tags: tags.to_string(),
        }
    }

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
        assert_eq!(csv_escape("cr\ronly"), "cr\ronly");
        assert_eq!(csv_escape(""), "");
    }

    #[test]
    fn csv_has_header_and_one_line_per_task() {
        let csv = tasks_to_csv(&[view("Buy milk, eggs", "home"), view("Plain", "")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "t1,\"Buy milk, eggs\",2024-06-03,false,High,2,home");
        assert_eq!(lines[2], "t1,Plain,2024-06-03,false,High,2,");
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn csv_of_nothing_is_header_only() {
        assert_eq!(tasks_to_csv(&[]), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn sentinel_days_left_is_written_verbatim() {
        let mut task = view("Later", "");
        task.priority = Priority::Low;
        task.days_left = i64::MAX;
        let csv = tasks_to_csv(&[task]);
        assert!(csv.contains(&format!("Low,{}", i64::MAX)));
    }
}
