#[cfg(test)]
mod tests {
    use planboard::libs::drilldown::{DrilldownRow, DrilldownView};
    use planboard::libs::pivot::PivotRow;
    use planboard::libs::sort::{sort_drilldown, sort_rows, SortDirection, SortField, SortState};
    use std::collections::BTreeMap;

    fn row(label: &str, total: f64, march: f64) -> PivotRow {
        let mut buckets = BTreeMap::new();
        buckets.insert("2026-03".to_string(), march);
        PivotRow {
            key: label.to_lowercase(),
            label: label.to_string(),
            dimensions: Vec::new(),
            buckets,
            planned_buckets: BTreeMap::new(),
            planned_total: 0.0,
            total,
        }
    }

    fn labels(rows: &[PivotRow]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn test_default_state_sorts_by_total_desc() {
        let mut rows = vec![row("Альфа", 5.0, 1.0), row("Бета", 20.0, 0.0), row("Гамма", 10.0, 3.0)];
        SortState::default().apply(&mut rows);
        assert_eq!(labels(&rows), vec!["Бета", "Гамма", "Альфа"]);
    }

    #[test]
    fn test_name_sort_is_case_insensitive_and_folds_yo() {
        let mut rows = vec![row("ёлка", 1.0, 0.0), row("Ежевика", 1.0, 0.0), row("ель", 1.0, 0.0), row("Дуб", 1.0, 0.0)];
        sort_rows(&mut rows, &SortField::Name, SortDirection::Asc);
        assert_eq!(labels(&rows), vec!["Дуб", "Ежевика", "ёлка", "ель"]);
    }

    #[test]
    fn test_bucket_sort_treats_missing_as_zero() {
        let mut rows = vec![row("a", 1.0, 2.0), row("b", 1.0, 7.0), row("c", 1.0, 0.0)];
        rows[2].buckets.clear();
        sort_rows(&mut rows, &SortField::Bucket("2026-03".into()), SortDirection::Asc);
        assert_eq!(labels(&rows), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ties_keep_fold_order() {
        let mut rows = vec![row("first", 3.0, 0.0), row("second", 3.0, 0.0), row("third", 9.0, 0.0)];
        sort_rows(&mut rows, &SortField::Total, SortDirection::Desc);
        assert_eq!(labels(&rows), vec!["third", "first", "second"]);
        sort_rows(&mut rows, &SortField::Total, SortDirection::Asc);
        assert_eq!(labels(&rows), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(SortField::parse("name"), SortField::Name);
        assert_eq!(SortField::parse(""), SortField::Total);
        assert_eq!(SortField::parse("2026-Q2"), SortField::Bucket("2026-Q2".into()));
        assert_eq!(SortField::Name.default_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_drilldown_directory_order() {
        let make = |name: &str, scope: &str, hours: f64| DrilldownRow {
            name: name.into(),
            scope_name: scope.into(),
            total_hours: hours,
            ..Default::default()
        };
        let mut rows = vec![make("Бэкап", "ИТ", 1.0), make("Аудит", "ИТ", 2.0), make("Отчёт", "Бухгалтерия", 3.0)];
        sort_drilldown(&mut rows, DrilldownView::Process);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Отчёт", "Аудит", "Бэкап"]);

        sort_drilldown(&mut rows, DrilldownView::Department);
        let hours: Vec<f64> = rows.iter().map(|r| r.total_hours).collect();
        assert_eq!(hours, vec![3.0, 2.0, 1.0]);
    }
}
