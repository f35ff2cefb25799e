#[cfg(test)]
mod tests {
    use planboard::libs::bucket::{ReportPeriod, TimeGrain};
    use planboard::libs::dimension::Dimension;
    use planboard::libs::distribution::DistributionType;
    use planboard::libs::error::ReportError;
    use planboard::libs::metric::Metric;
    use planboard::libs::pivot::{aggregate, PivotFilters, PivotRequest};
    use planboard::libs::plan::{
        Company, Dataset, Department, InfrastructureSnapshot, Measure, Plan, PlanCompany, PlanStatus, Process,
        TaskHours, User,
    };
    use test_context::{test_context, TestContext};

    /// Small planning dataset: two companies, two processes, two employees.
    struct PivotTestContext {
        dataset: Dataset,
    }

    impl TestContext for PivotTestContext {
        fn setup() -> Self {
            PivotTestContext { dataset: base_dataset() }
        }
    }

    fn base_dataset() -> Dataset {
        Dataset {
            companies: vec![
                Company { company_id: "x".into(), name: "Альфа".into(), rate_per_hour: Some(10.0) },
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
                    service_name: None,
                    process_id: Some("pr1".into()),
                    category: Some("operational".into()),
                },
                Measure {
                    measure_id: "m2".into(),
                    name: "Миграция".into(),
                    service_name: None,
                    process_id: Some("pr2".into()),
                    category: Some("strategic".into()),
                },
            ],
            departments: vec![Department { department_id: "d1".into(), name: "ИТ".into() }],
            users: vec![
                User { user_id: "u1".into(), full_name: Some("Иванов".into()), department_id: Some("d1".into()) },
                User { user_id: "u2".into(), full_name: Some("Петров".into()), department_id: Some("d1".into()) },
            ],
            ..Default::default()
        }
    }

    fn plan(id: &str, month: u32, measure: &str, distribution: DistributionType) -> Plan {
        let mut plan = Plan::monthly(id, 2026, month, PlanStatus::Active);
        plan.measure_id = Some(measure.to_string());
        plan.distribution_type = Some(distribution);
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

    fn row_total(response: &planboard::libs::pivot::PivotResponse, key: &str) -> f64 {
        response.rows.iter().find(|r| r.key == key).map(|r| r.total).unwrap()
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_even_split_between_two_companies(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 3, "m1", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 100.0, 4));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y")]);

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]);
        let response = aggregate(dataset, &request).unwrap();

        assert_eq!(response.rows.len(), 2);
        assert_eq!(row_total(&response, "x"), 50.0);
        assert_eq!(row_total(&response, "y"), 50.0);
        assert_eq!(response.grand_total, 100.0);
        assert_eq!(response.rows[0].buckets["2026-03"], 50.0);
        assert_eq!(response.rows[0].buckets["2026-04"], 0.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_infrastructure_weighted_split(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 3, "m1", DistributionType::InfrastructureWeighted));
        dataset.task_hours.push(hours("p1", "u1", 100.0, 4));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y")]);
        dataset.infrastructure.extend([
            InfrastructureSnapshot {
                company_id: "x".into(),
                period_year: 2026,
                period_month: 3,
                servers_count: 2,
                workstations_count: 8,
            },
            InfrastructureSnapshot {
                company_id: "y".into(),
                period_year: 2026,
                period_month: 3,
                servers_count: 0,
                workstations_count: 0,
            },
        ]);

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]);
        let response = aggregate(dataset, &request).unwrap();

        assert_eq!(row_total(&response, "x"), 100.0);
        assert_eq!(row_total(&response, "y"), 0.0);
        assert_eq!(response.grand_total, 100.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_composite_rows_are_not_merged(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, "m1", DistributionType::Even));
        dataset.plans.push(plan("p2", 1, "m2", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 10.0, 1));
        dataset.task_hours.push(hours("p2", "u2", 30.0, 3));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y"), link("p2", "x"), link("p2", "y")]);

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company, Dimension::Process]);
        let response = aggregate(dataset, &request).unwrap();

        assert_eq!(response.rows.len(), 4);
        let labels: Vec<&str> = response.rows.iter().map(|r| r.label.as_str()).collect();
        assert!(labels.contains(&"Альфа / Сопровождение"));
        assert!(labels.contains(&"Бета / Развитие"));
        assert_eq!(row_total(&response, "x::pr1"), 5.0);
        assert_eq!(row_total(&response, "y::pr2"), 15.0);
        assert_eq!(response.grand_total, 40.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_kpi_without_plan_is_zero(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 2, "m1", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 12.0, 1));

        let request =
            PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Employee]).with_metric(Metric::Kpi);
        let response = aggregate(dataset, &request).unwrap();

        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].total, 0.0);
        assert!(response.rows[0].buckets.values().all(|v| v.is_finite()));
        assert_eq!(response.grand_total, 0.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_kpi_totals_sum_row_values(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        let mut p1 = plan("p1", 1, "m1", DistributionType::Even);
        p1.planned_hours = Some(10.0);
        let mut p2 = plan("p2", 1, "m2", DistributionType::Even);
        p2.planned_hours = Some(30.0);
        dataset.plans.extend([p1, p2]);
        dataset.task_hours.push(hours("p1", "u1", 10.0, 1));
        dataset.task_hours.push(hours("p2", "u2", 15.0, 1));

        let request =
            PivotRequest::new(ReportPeriod::month(2026, 1), vec![Dimension::Process]).with_metric(Metric::Kpi);
        let response = aggregate(dataset, &request).unwrap();

        assert_eq!(row_total(&response, "pr1"), 100.0);
        assert_eq!(row_total(&response, "pr2"), 50.0);
        assert_eq!(response.grand_total, 150.0);
        assert_eq!(response.column_totals["2026-01"], 150.0);
        assert_eq!(response.stats.kpi, 62.5);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_totals_match_row_sums_for_every_metric(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        let mut p1 = plan("p1", 2, "m1", DistributionType::Even);
        p1.planned_hours = Some(10.0);
        let mut p2 = plan("p2", 3, "m2", DistributionType::Even);
        p2.planned_hours = Some(10.0);
        dataset.plans.extend([p1, p2]);
        dataset.task_hours.push(hours("p1", "u1", 5.0, 2));
        dataset.task_hours.push(hours("p2", "u2", 10.0, 3));
        dataset.plan_companies.extend([link("p1", "x"), link("p2", "y")]);

        for metric in Metric::ALL {
            let request = PivotRequest::new(ReportPeriod::quarter(2026, 1), vec![Dimension::Company])
                .with_time_grain(TimeGrain::Month)
                .with_metric(metric);
            let response = aggregate(dataset, &request).unwrap();

            let row_sum: f64 = response.rows.iter().map(|row| row.total).sum();
            let column_sum: f64 = response.column_totals.values().sum();
            assert!((response.grand_total - row_sum).abs() < 1e-9, "{metric}");
            assert!((response.grand_total - column_sum).abs() < 1e-9, "{metric}");
            for (key, total) in &response.column_totals {
                let cells: f64 = response.rows.iter().map(|row| row.buckets[key]).sum();
                assert!((total - cells).abs() < 1e-9, "{metric} {key}");
            }
        }

        let request = PivotRequest::new(ReportPeriod::quarter(2026, 1), vec![Dimension::Company])
            .with_time_grain(TimeGrain::Month)
            .with_metric(Metric::Kpi);
        let response = aggregate(dataset, &request).unwrap();
        assert_eq!(row_total(&response, "x"), 50.0);
        assert_eq!(row_total(&response, "y"), 100.0);
        assert_eq!(response.grand_total, 150.0);
        assert_eq!(response.column_totals["2026-02"], 50.0);
        assert_eq!(response.column_totals["2026-03"], 100.0);
        assert_eq!(response.column_totals["2026-01"], 0.0);
        assert_eq!(response.stats.kpi, 75.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_hours_are_conserved_across_groupings(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, "m1", DistributionType::Even));
        dataset.plans.push(plan("p2", 5, "m2", DistributionType::ByServers));
        dataset.task_hours.push(hours("p1", "u1", 7.0, 1));
        dataset.task_hours.push(hours("p1", "u2", 3.0, 2));
        dataset.task_hours.push(hours("p2", "u2", 11.0, 3));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y"), link("p1", "z"), link("p2", "x")]);

        for group_by in [
            vec![Dimension::Company],
            vec![Dimension::Department],
            vec![Dimension::Employee, Dimension::Process],
            vec![Dimension::Category],
        ] {
            let request = PivotRequest::new(ReportPeriod::year(2026), group_by);
            let response = aggregate(dataset, &request).unwrap();
            assert!((response.grand_total - 21.0).abs() < 1e-9);

            let row_sum: f64 = response.rows.iter().map(|r| r.total).sum();
            let column_sum: f64 = response.column_totals.values().sum();
            assert!((row_sum - response.grand_total).abs() < 1e-9);
            assert!((column_sum - response.grand_total).abs() < 1e-9);

            for row in &response.rows {
                let buckets: f64 = row.buckets.values().sum();
                assert!((buckets - row.total).abs() < 1e-9);
            }
        }
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_aggregation_is_idempotent(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, "m1", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 7.0, 1));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y")]);

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company, Dimension::Employee]);
        let first = aggregate(dataset, &request).unwrap();
        let second = aggregate(dataset, &request).unwrap();
        assert_eq!(first, second);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_period_outside_plans_is_empty(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, "m1", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 7.0, 1));

        let request = PivotRequest::new(ReportPeriod::quarter(2026, 2), vec![Dimension::Company]);
        let response = aggregate(dataset, &request).unwrap();
        assert!(response.rows.is_empty());
        assert_eq!(response.bucket_keys(), vec!["2026-04", "2026-05", "2026-06"]);
        assert_eq!(response.grand_total, 0.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_quarter_grain_places_each_plan_once(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 2, "m1", DistributionType::Even));
        dataset.plans.push(plan("p2", 4, "m1", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 4.0, 1));
        dataset.task_hours.push(hours("p2", "u1", 6.0, 1));

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Process])
            .with_time_grain(TimeGrain::Quarter);
        let response = aggregate(dataset, &request).unwrap();

        assert_eq!(response.bucket_keys(), vec!["2026-Q1", "2026-Q2", "2026-Q3", "2026-Q4"]);
        let row = &response.rows[0];
        assert_eq!(row.buckets["2026-Q1"], 4.0);
        assert_eq!(row.buckets["2026-Q2"], 6.0);
        assert_eq!(row.total, 10.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_non_reportable_statuses_are_skipped(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        let mut draft = plan("p1", 1, "m1", DistributionType::Even);
        draft.status = PlanStatus::Draft;
        dataset.plans.push(draft);
        dataset.plans.push(plan("p2", 1, "m1", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 100.0, 1));
        dataset.task_hours.push(hours("p2", "u1", 1.0, 1));

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Employee]);
        let response = aggregate(dataset, &request).unwrap();
        assert_eq!(response.grand_total, 1.0);

        let request = request.with_statuses(vec![PlanStatus::Draft, PlanStatus::Active]);
        let response = aggregate(dataset, &request).unwrap();
        assert_eq!(response.grand_total, 101.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_filters_restrict_rows(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 1, "m1", DistributionType::Even));
        dataset.plans.push(plan("p2", 1, "m2", DistributionType::Even));
        dataset.task_hours.push(hours("p1", "u1", 10.0, 1));
        dataset.task_hours.push(hours("p2", "u2", 20.0, 1));
        dataset.plan_companies.extend([link("p1", "x"), link("p2", "y")]);

        let filters = PivotFilters { process_ids: vec!["pr2".into()], ..Default::default() };
        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]).with_filters(filters);
        let response = aggregate(dataset, &request).unwrap();
        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].key, "y");
        assert_eq!(response.grand_total, 20.0);

        let filters = PivotFilters { categories: vec!["operational".into()], ..Default::default() };
        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Employee]).with_filters(filters);
        let response = aggregate(dataset, &request).unwrap();
        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].key, "u1");
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_missing_references_use_unknown_rows(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        let mut orphan = Plan::monthly("p1", 2026, 1, PlanStatus::Completed);
        orphan.measure_id = Some("missing".into());
        dataset.plans.push(orphan);
        dataset.task_hours.push(TaskHours {
            plan_id: "p1".into(),
            user_id: None,
            total_spent_hours: 5.0,
            tasks_count: 1,
        });

        let request = PivotRequest::new(
            ReportPeriod::year(2026),
            vec![Dimension::Company, Dimension::Process, Dimension::Employee],
        );
        let response = aggregate(dataset, &request).unwrap();

        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].key, "unknown-company::unknown-process::unknown-employee");
        assert_eq!(response.rows[0].label, "Без предприятия / Без процесса / Неизвестно");
        assert_eq!(response.grand_total, 5.0);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_cost_and_planned_metrics(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        let mut p1 = plan("p1", 1, "m1", DistributionType::Even);
        p1.planned_hours = Some(40.0);
        dataset.plans.push(p1);
        dataset.task_hours.push(hours("p1", "u1", 10.0, 2));
        dataset.task_hours.push(hours("p1", "u2", 10.0, 2));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y")]);

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]).with_metric(Metric::Cost);
        let response = aggregate(dataset, &request).unwrap();
        assert_eq!(row_total(&response, "x"), 100.0);
        assert_eq!(row_total(&response, "y"), 0.0);

        let request =
            PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]).with_metric(Metric::Planned);
        let response = aggregate(dataset, &request).unwrap();
        assert_eq!(row_total(&response, "x"), 20.0);
        assert_eq!(response.grand_total, 40.0);
        assert_eq!(response.stats.planned_hours, 40.0);
        assert_eq!(response.stats.companies_count, 2);
        assert_eq!(response.stats.employees_count, 2);
    }

    #[test_context(PivotTestContext)]
    #[test]
    fn test_task_counts_are_conserved_by_allocation(ctx: &mut PivotTestContext) {
        let dataset = &mut ctx.dataset;
        dataset.plans.push(plan("p1", 6, "m1", DistributionType::ByWorkstations));
        dataset.task_hours.push(hours("p1", "u1", 9.0, 7));
        dataset.task_hours.push(hours("p1", "u2", 1.0, 4));
        dataset.plan_companies.extend([link("p1", "x"), link("p1", "y")]);
        dataset.infrastructure.extend([
            InfrastructureSnapshot {
                company_id: "x".into(),
                period_year: 2026,
                period_month: 6,
                servers_count: 0,
                workstations_count: 60,
            },
            InfrastructureSnapshot {
                company_id: "y".into(),
                period_year: 2026,
                period_month: 6,
                servers_count: 9,
                workstations_count: 40,
            },
        ]);

        let request = PivotRequest::new(ReportPeriod::year(2026), vec![Dimension::Company]).with_metric(Metric::Tasks);
        let response = aggregate(dataset, &request).unwrap();

        assert!((row_total(&response, "x") - 6.6).abs() < 1e-9);
        assert!((row_total(&response, "y") - 4.4).abs() < 1e-9);
        assert!((response.grand_total - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_request_rejects_bad_period() {
        assert_eq!(
            PivotRequest::parse(2026, "quarter", Some(5), "company", "month", "hours"),
            Err(ReportError::InvalidPeriodValue { period_type: "quarter".into(), value: Some(5) })
        );
        assert_eq!(
            PivotRequest::parse(2026, "decade", None, "company", "month", "hours"),
            Err(ReportError::UnknownPeriodType("decade".into()))
        );
        assert_eq!(
            PivotRequest::parse(2026, "year", None, "company,region", "month", "hours"),
            Err(ReportError::UnknownDimension("region".into()))
        );
    }
}
