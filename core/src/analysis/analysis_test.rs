#[cfg(test)]
mod tests {
    use crate::analysis::{Trend, analyze, check_samples, compare_parameters, scale_group};
    use crate::config::AnalysisConfig;
    use crate::error::WarningKind;
    use crate::suite::{OutlierCounts, ResultRecord, aggregate};
    use std::cmp::Ordering;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn linear_insert_costs_are_stable() {
        let records = [
            ResultRecord::new("jmt_insert", "1000", 1_798_300.0),
            ResultRecord::new("jmt_insert", "10", 17_900.0),
            ResultRecord::new("jmt_insert", "100", 182_700.0),
        ];
        let scaling = scale_group("jmt_insert", records.iter(), 0.10);

        let sizes: Vec<u64> = scaling.points.iter().map(|p| p.size).collect();
        assert_eq!(sizes, vec![10, 100, 1000]);

        let costs: Vec<f64> = scaling.points.iter().map(|p| p.per_entry_nanos).collect();
        assert!(close(costs[0], 1_790.0));
        assert!(close(costs[1], 1_827.0));
        assert!(close(costs[2], 1_798.3));

        assert_eq!(scaling.trend, Trend::Stable);
        let change = scaling.cost_change.expect("two or more points");
        assert!(change.abs() < 0.01);
    }

    #[test]
    fn growing_per_entry_cost_is_superlinear() {
        let records = [
            ResultRecord::new("jmt_update", "10", 1_000.0),
            ResultRecord::new("jmt_update", "1000", 200_000.0),
        ];
        let scaling = scale_group("jmt_update", records.iter(), 0.10);
        assert_eq!(scaling.trend, Trend::Superlinear);
        assert!(close(scaling.cost_change.expect("defined"), 1.0));
    }

    #[test]
    fn shrinking_per_entry_cost_is_sublinear() {
        let records = [
            ResultRecord::new("jmt_get", "10", 10_000.0),
            ResultRecord::new("jmt_get", "1000", 500_000.0),
        ];
        let scaling = scale_group("jmt_get", records.iter(), 0.10);
        assert_eq!(scaling.trend, Trend::Sublinear);
    }

    #[test]
    fn change_within_tolerance_is_stable() {
        let records = [
            ResultRecord::new("g", "1", 100.0),
            ResultRecord::new("g", "2", 210.0),
        ];
        assert_eq!(scale_group("g", records.iter(), 0.10).trend, Trend::Stable);
        assert_eq!(scale_group("g", records.iter(), 0.04).trend, Trend::Superlinear);
    }

    #[test]
    fn non_numeric_parameters_are_kept_raw() {
        let records = [
            ResultRecord::new("hashing", "sha256", 400.0),
            ResultRecord::new("hashing", "64", 640.0),
            ResultRecord::new("hashing", "blake3", 120.0),
        ];
        let scaling = scale_group("hashing", records.iter(), 0.10);

        assert_eq!(scaling.points.len(), 1);
        assert_eq!(scaling.points[0].per_entry_nanos, 10.0);
        let raw: Vec<&str> = scaling.raw.iter().map(|p| p.parameter.as_str()).collect();
        assert_eq!(raw, vec!["blake3", "sha256"]);
        assert_eq!(scaling.trend, Trend::Undetermined);
        assert_eq!(scaling.cost_change, None);
        assert_eq!(scaling.parameter_order().collect::<Vec<_>>(), vec!["64", "blake3", "sha256"]);
    }

    #[test]
    fn zero_cost_baseline_does_not_divide_by_zero() {
        let records = [ResultRecord::new("g", "1", 0.0), ResultRecord::new("g", "10", 50.0)];
        let scaling = scale_group("g", records.iter(), 0.10);
        assert_eq!(scaling.trend, Trend::Superlinear);
        assert_eq!(scaling.cost_change, None);
    }

    #[test]
    fn short_sampling_is_flagged_with_suggestions() {
        let config = AnalysisConfig::default();
        // Linear sampling with 100 samples runs 1 + 2 + ... + 100 iterations.
        let record = ResultRecord::new("jmt_insert", "10", 17_900.0)
            .with_sample_count(100)
            .with_total_iterations(5_050);

        let warning = check_samples(&record, &config).expect("90ms of sampling is below the 1s target");
        assert_eq!(warning.kind, WarningKind::InsufficientSamples);
        assert_eq!(warning.group.as_deref(), Some("jmt_insert"));
        assert_eq!(warning.parameter.as_deref(), Some("10"));
        assert!(warning.reason.contains("90.40ms"));
        assert!(warning.reason.contains("increase the measurement time"));
        assert!(warning.reason.contains("enable flat sampling"));
        assert!(warning.reason.contains("reduce the sample count to 10"));
    }

    #[test]
    fn too_few_samples_are_flagged() {
        let config = AnalysisConfig::default();
        let record = ResultRecord::new("jmt_get", "1000", 5e9).with_sample_count(5);
        let warning = check_samples(&record, &config).expect("5 samples is below the minimum");
        assert!(warning.reason.contains("only 5 collected (minimum 10)"));
    }

    #[test]
    fn sufficient_or_unknown_sampling_is_not_flagged() {
        let config = AnalysisConfig::default();
        let long = ResultRecord::new("jmt_get", "10", 9_100.0)
            .with_sample_count(100)
            .with_total_iterations(5_000_000);
        assert!(check_samples(&long, &config).is_none());

        let unknown = ResultRecord::new("jmt_get", "10", 1.0);
        assert!(check_samples(&unknown, &config).is_none());
    }

    #[test]
    fn analyze_collects_warnings_and_outliers_per_group() {
        let outliers = OutlierCounts {
            mild_low: 0,
            mild_high: 4,
            severe_low: 1,
            severe_high: 2,
        };
        let aggregated = aggregate(vec![
            Ok(ResultRecord::new("jmt_insert", "10", 17_900.0)
                .with_sample_count(100)
                .with_total_iterations(5_050)
                .with_outliers(outliers)),
            Ok(ResultRecord::new("jmt_insert", "100", 182_700.0)),
            Ok(ResultRecord::new("jmt_get", "10", 9_100.0)),
        ]);

        let report = analyze(&aggregated.suite, &AnalysisConfig::default());
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings_for("jmt_insert").count(), 1);
        assert_eq!(report.warnings_for("jmt_get").count(), 0);

        let insert = report.group("jmt_insert").expect("group analyzed");
        assert_eq!(insert.outliers.len(), 1);
        assert_eq!(insert.outliers[0].parameter, "10");
        assert_eq!(insert.outliers[0].counts, outliers);
        assert_eq!(insert.outliers[0].counts.severe(), 3);
        assert_eq!(report.group("jmt_get").map(|g| g.trend), Some(Trend::Undetermined));
    }

    #[test]
    fn parameter_comparison_puts_sizes_first() {
        assert_eq!(compare_parameters("10", "100"), Ordering::Less);
        assert_eq!(compare_parameters("1000", "100"), Ordering::Greater);
        assert_eq!(compare_parameters("10", "abc"), Ordering::Less);
        assert_eq!(compare_parameters("abc", "abd"), Ordering::Less);
    }
}
