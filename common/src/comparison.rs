//! 初期データセットと最終データセットの比較レポート

use std::collections::HashMap;

use crate::regions::region_order;
use crate::types::AnalysisResult;

/// 数値1項目の差分
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDelta {
    pub label: &'static str,
    pub initial: f64,
    pub final_value: f64,
}

impl MetricDelta {
    fn new(label: &'static str, initial: f64, final_value: f64) -> Self {
        Self {
            label,
            initial,
            final_value,
        }
    }

    pub fn delta(&self) -> f64 {
        self.final_value - self.initial
    }

    /// 変化率（初期値0のときはNone）
    pub fn percent_change(&self) -> Option<f64> {
        if self.initial == 0.0 {
            None
        } else {
            Some(self.delta() / self.initial * 100.0)
        }
    }

    /// "+12" / "-3" / "0"（小数は1桁）
    pub fn delta_label(&self) -> String {
        format_signed(self.delta())
    }

    /// CSSクラス（増: up, 減: down, 変化なし: same）
    pub fn trend_class(&self) -> &'static str {
        let d = self.delta();
        if d > 0.0 {
            "delta-up"
        } else if d < 0.0 {
            "delta-down"
        } else {
            "delta-same"
        }
    }
}

/// 地域ごとの件数差分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDelta {
    pub region: String,
    pub initial: u64,
    pub final_count: u64,
}

impl RegionDelta {
    pub fn delta(&self) -> i64 {
        self.final_count as i64 - self.initial as i64
    }

    pub fn delta_label(&self) -> String {
        format_signed(self.delta() as f64)
    }

    pub fn trend_class(&self) -> &'static str {
        match self.delta() {
            d if d > 0 => "delta-up",
            d if d < 0 => "delta-down",
            _ => "delta-same",
        }
    }
}

/// 比較レポート
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaReport {
    pub metrics: Vec<MetricDelta>,
    pub regions: Vec<RegionDelta>,
}

impl DeltaReport {
    pub fn between(initial: &AnalysisResult, final_result: &AnalysisResult) -> Self {
        let metrics = vec![
            MetricDelta::new(
                "Total companies",
                initial.summary.total_companies as f64,
                final_result.summary.total_companies as f64,
            ),
            MetricDelta::new(
                "England companies",
                initial.summary.total_england_companies as f64,
                final_result.summary.total_england_companies as f64,
            ),
            MetricDelta::new(
                "Unique counties",
                initial.summary.unique_counties as f64,
                final_result.summary.unique_counties as f64,
            ),
            MetricDelta::new(
                "Data quality score",
                initial.data_quality_score,
                final_result.data_quality_score,
            ),
            MetricDelta::new(
                "Missing postcode",
                initial.missing_data.postcode_missing as f64,
                final_result.missing_data.postcode_missing as f64,
            ),
            MetricDelta::new(
                "Missing county",
                initial.missing_data.county_missing as f64,
                final_result.missing_data.county_missing as f64,
            ),
        ];

        let mut by_region: HashMap<String, RegionDelta> = HashMap::new();
        for r in &initial.regional_distribution {
            by_region
                .entry(r.region.clone())
                .or_insert_with(|| RegionDelta {
                    region: r.region.clone(),
                    initial: 0,
                    final_count: 0,
                })
                .initial += r.count;
        }
        for r in &final_result.regional_distribution {
            by_region
                .entry(r.region.clone())
                .or_insert_with(|| RegionDelta {
                    region: r.region.clone(),
                    initial: 0,
                    final_count: 0,
                })
                .final_count += r.count;
        }

        let mut regions: Vec<RegionDelta> = by_region.into_values().collect();
        regions.sort_by(|a, b| {
            region_order(&a.region)
                .cmp(&region_order(&b.region))
                .then_with(|| a.region.cmp(&b.region))
        });

        Self { metrics, regions }
    }

    pub fn metric(&self, label: &str) -> Option<&MetricDelta> {
        self.metrics.iter().find(|m| m.label == label)
    }

    /// CLI向けのテキスト表
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<22} {:>10} {:>10} {:>10}\n",
            "Metric",
            "Initial",
            "Final",
            "Change"
        ));
        for m in &self.metrics {
            out.push_str(&format!(
                "{:<22} {:>10} {:>10} {:>10}\n",
                m.label,
                format_number(m.initial),
                format_number(m.final_value),
                m.delta_label()
            ));
        }
        if !self.regions.is_empty() {
            out.push('\n');
            out.push_str(&format!(
                "{:<22} {:>10} {:>10} {:>10}\n",
                "Region",
                "Initial",
                "Final",
                "Change"
            ));
            for r in &self.regions {
                out.push_str(&format!(
                    "{:<22} {:>10} {:>10} {:>10}\n",
                    r.region,
                    r.initial,
                    r.final_count,
                    r.delta_label()
                ));
            }
        }
        out
    }
}

/// 整数ならそのまま、小数は1桁
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn format_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_number(value))
    } else {
        format_number(value)
    }
}
