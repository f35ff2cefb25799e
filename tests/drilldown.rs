#[cfg(test)]
mod tests {
    use planboard::libs::distribution::DistributionType;
    use planboard::libs::drilldown::{
        aggregate, period_overview, DrilldownPeriod, DrilldownRequest, DrilldownView, SUMMARY_ID, SUMMARY_NAME,
    };
    use planboard::libs::error::ReportError;
    use planboard::libs::plan::{
        Company, Dataset, Department, Measure, Plan, PlanCompany, PlanStatus, Process, TaskHours, User,
    };
    use test_context::{test_context, TestContext};

    struct DrilldownTestContext {
        dataset: Dataset,
    }

    impl TestContext for DrilldownTestContext {
        fn setup() -> Self {
            let dataset = Dataset {
                companies: vec![
                    Company { company_id: "x".into(), name: "Альфа".into(), rate_per_hour: None },
                    Company { company_id: "y".into(), name: "Бета".into(), rate_per_hour: None },
                ],
                processes: vec![
                    Process { process_id: "pr1".into(), name: "Сопровождение".into() },
                    Process { process_id: "pr2".into(), name: "Развитие".into() },
                ],
                measures: vec![
                    Measure {
                        measure_id: "m1".into(),
                        name: "Бэкап".into(),
                        service_name: Some("Резервное копирование".into()),
                        process_id: Some("pr1".into()),
                        category: None,
                    },
                    Measure {
                        measure_id: "m2".into(),
                        name: "Миграция".into(),
                        service_name: None,
                        process_id: Some("pr2".into()),
                        category: None,
                    },
                ],
                departments: vec![
                    Department { department_id: "d1".into(), name: "Инфраструктура".into() },
                    Department { department_id: "d2".into(), name: "Аналитика".into() },
                ],
                users: vec![
                    User { user_id: "u1".into(), full_name: Some("Иванов".into()), department_id: Some("d1".into()) },
                    User { user_id: "u2".into(), full_name: Some("Петров".into()), department_id: Some("d1".into()) },
                    User { user_id: "u3".into(), full_name: Some("Сидоров".into()), department_id: Some("d2".into()) },
                ],
                ..Default::default()
            };
            DrilldownTestContext { dataset }
        }
    }

    fn plan(id: &str, month: u32, status: PlanStatus, measure: &str, department: &str) -> Plan {
        let mut plan = Plan::monthly(id, 2026, month, status);
        plan.measure_id = Some(measure.to_string());
        plan.department_id = Some(department.to_string());
        plan
    }

    fn hours(plan_id: &str, user_id: &str, hours: f64, tasks: u32) -> TaskHours {
        TaskHours {
            plan_id: plan_id.into(),
            user_id: Some(user_id.into()),
            total_spent_hours: hours,
            tasks_count: tasks,
        }
    }

    fn link(plan_id: &str, company_id: &str) -> PlanCompany {
        PlanCompany { plan_id: plan_id.into(), company_id: company_id.into(), company_name: None }
    }

    #[test_context(DrilldownTestContext)]
    #[test]
    fn test_employee_counts_both_statuses(ctx: &mut DrilldownTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 3, PlanStatus::Active, "m1", "d1"));
        dataset.plans.push(plan("p2", 3, PlanStatus::Completed, "m2", "d1"));
        dataset.task_hours.push(hours("p1", "u1", 30.0, 20));
        dataset.task_hours.push(hours("p2", "u1", 6.0, 5));

        let request = DrilldownRequest::new(2026, DrilldownPeriod::Month(3), DrilldownView::Employee);
        let report = aggregate(dataset, &request).unwrap();

        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.id, "u1");
        assert_eq!(row.name, "Иванов");
        assert_eq!(row.active_count, 1);
        assert_eq!(row.completed_count, 1);
        assert_eq!(row.tasks_count, 25.0);
        assert_eq!(row.total_hours, 36.0);
        assert_eq!(row.status_text(), "1/1");
        assert_eq!(report.period_label, "Март 2026");
    }

    #[test_context(DrilldownTestContext)]
    #[test]
    fn test_process_rows_are_scoped_by_department(ctx: &mut DrilldownTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, PlanStatus::Active, "m1", "d1"));
        dataset.plans.push(plan("p2", 2, PlanStatus::Active, "m1", "d1"));
        dataset.plans.push(plan("p3", 2, PlanStatus::Completed, "m1", "d2"));
        dataset.plans.push(plan("p4", 5, PlanStatus::Active, "m1", "d1"));
        dataset.task_hours.push(hours("p1", "u1", 1.0, 1));
        dataset.task_hours.push(hours("p2", "u2", 2.0, 1));
        dataset.task_hours.push(hours("p3", "u3", 4.0, 1));
        dataset.task_hours.push(hours("p4", "u1", 8.0, 1));

        let request = DrilldownRequest::new(2026, DrilldownPeriod::Quarter(1), DrilldownView::Process);
        let report = aggregate(dataset, &request).unwrap();

        assert_eq!(report.rows.len(), 2);
        // Аналитика sorts before Инфраструктура
        assert_eq!(report.rows[0].scope_name, "Аналитика");
        assert_eq!(report.rows[0].total_hours, 4.0);
        assert_eq!(report.rows[1].scope_name, "Инфраструктура");
        assert_eq!(report.rows[1].active_count, 2);
        assert_eq!(report.rows[1].total_hours, 3.0);
        assert_eq!(report.totals().total_hours, 7.0);
    }

    #[test_context(DrilldownTestContext)]
    #[test]
    fn test_procedure_prefers_service_name(ctx: &mut DrilldownTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, PlanStatus::Active, "m1", "d1"));
        dataset.plans.push(plan("p2", 1, PlanStatus::Active, "m2", "d1"));

        let request = DrilldownRequest::new(2026, DrilldownPeriod::Month(1), DrilldownView::Procedure);
        let report = aggregate(dataset, &request).unwrap();

        let names: Vec<&str> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Миграция", "Резервное копирование"]);
    }

    #[test_context(DrilldownTestContext)]
    #[test]
    fn test_company_summary_allocates_before_rollup(ctx: &mut DrilldownTestContext) {
        let dataset = &mut ctx.dataset;
        let mut shared = plan("p1", 4, PlanStatus::Active, "m1", "d1");
        shared.distribution_type = Some(DistributionType::Even);
        dataset.plans.push(shared);
        dataset.plans.push(plan("p2", 4, PlanStatus::Completed, "m2", "d1"));
        dataset.task_hours.push(hours("p1", "u1", 10.0, 2));
        dataset.task_hours.push(hours("p1", "u2", 30.0, 2));
        dataset.task_hours.push(hours("p2", "u1", 5.0, 1));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y"), link("p2", "x")]);

        let request = DrilldownRequest::new(2026, DrilldownPeriod::Month(4), DrilldownView::Company);
        let report = aggregate(dataset, &request).unwrap();

        assert_eq!(report.rows.len(), 2);
        let first = &report.rows[0];
        assert_eq!(first.id, SUMMARY_ID);
        assert_eq!(first.name, SUMMARY_NAME);
        assert_eq!(first.scope_name, "Альфа");
        assert_eq!(first.total_hours, 25.0);
        assert_eq!(first.active_count, 1);
        assert_eq!(first.completed_count, 1);
        assert_eq!(first.tasks_count, 3.0);

        let second = &report.rows[1];
        assert_eq!(second.scope_name, "Бета");
        assert_eq!(second.total_hours, 20.0);
        assert_eq!(second.active_count, 1);

        // The shared plan's 40 hours are not counted twice.
        assert_eq!(report.totals().total_hours, 45.0);
    }

    #[test_context(DrilldownTestContext)]
    #[test]
    fn test_department_rollup_of_employees(ctx: &mut DrilldownTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 7, PlanStatus::Active, "m1", "d1"));
        dataset.task_hours.push(hours("p1", "u1", 2.0, 1));
        dataset.task_hours.push(hours("p1", "u2", 3.0, 1));
        dataset.task_hours.push(hours("p1", "u3", 10.0, 4));

        let request = DrilldownRequest::new(2026, DrilldownPeriod::Quarter(3), DrilldownView::Department);
        let report = aggregate(dataset, &request).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].name, "Аналитика");
        assert_eq!(report.rows[0].total_hours, 10.0);
        assert_eq!(report.rows[1].name, "Инфраструктура");
        assert_eq!(report.rows[1].total_hours, 5.0);
        // one (plan, user) record per employee
        assert_eq!(report.rows[1].active_count, 2);
    }

    #[test_context(DrilldownTestContext)]
    #[test]
    fn test_period_overview_lists_months_with_tasks(ctx: &mut DrilldownTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, PlanStatus::Active, "m1", "d1"));
        dataset.plans.push(plan("p2", 1, PlanStatus::Completed, "m2", "d1"));
        dataset.plans.push(plan("p3", 6, PlanStatus::Active, "m1", "d1"));
        dataset.plans.push(plan("p4", 9, PlanStatus::Active, "m1", "d1"));
        dataset.plans.push(plan("p5", 11, PlanStatus::Draft, "m1", "d1"));
        dataset.task_hours.push(hours("p1", "u1", 1.5, 1));
        dataset.task_hours.push(hours("p2", "u1", 2.5, 2));
        dataset.task_hours.push(hours("p3", "u2", 4.0, 3));
        dataset.task_hours.push(hours("p5", "u2", 4.0, 3));

        let periods = period_overview(dataset, &PlanStatus::REPORTABLE);

        let keys: Vec<&str> = periods.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["2026-06", "2026-01"]);
        assert_eq!(periods[1].tasks_count, 3.0);
        assert_eq!(periods[1].total_hours, 4.0);
        assert_eq!(periods[0].quarter, 2);
    }

    #[test]
    fn test_request_validation() {
        let request = DrilldownRequest::new(2026, DrilldownPeriod::Month(13), DrilldownView::Process);
        assert!(aggregate(&Dataset::default(), &request).is_err());

        assert_eq!(
            "region".parse::<DrilldownView>(),
            Err(ReportError::UnknownDrilldownDimension("region".into()))
        );
        assert_eq!("measure".parse::<DrilldownView>(), Ok(DrilldownView::Procedure));
    }
}
