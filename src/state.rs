use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::data::filter::{DateRange, Epoch, Frequency, PeriodKind};
use crate::data::model::TimeSeriesTable;
use crate::forecast::{ForecastError, Model, ModelRun};
use crate::stats::rolling::{anomaly_table, unique_dates, AnomalyRow};

// ---------------------------------------------------------------------------
// Per-view options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyOptions {
    pub window: usize,
    pub threshold: f64,
    pub show_rolling_mean: bool,
    pub page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Value,
    Share,
}

impl BarMode {
    pub fn label(&self) -> &'static str {
        match self {
            BarMode::Value => "Valor",
            BarMode::Share => "% del total",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarOptions {
    pub kind: PeriodKind,
    pub mode: BarMode,
    /// `None` is "(Todos)".
    pub active_product: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    Box,
    Violin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfMetric {
    Rmse,
    Mae,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidualPlot {
    Histogram,
    Density,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceOptions {
    pub metric: PerfMetric,
    pub accumulated: bool,
    /// Centred smoothing window, 0 disables it.
    pub smoothing: usize,
    pub residual_plot: ResidualPlot,
}

/// The chart sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Panorama,
    Seasonality,
    Heatmap,
    Bars,
    Distribution,
    Anomalies,
    RealVsPredicted,
    Performance,
    Metrics,
}

impl Panel {
    pub const ALL: [Panel; 9] = [
        Panel::Panorama,
        Panel::Seasonality,
        Panel::Heatmap,
        Panel::Bars,
        Panel::Distribution,
        Panel::Anomalies,
        Panel::RealVsPredicted,
        Panel::Performance,
        Panel::Metrics,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Panorama => "Panorama",
            Panel::Seasonality => "Estacionalidad",
            Panel::Heatmap => "Estacionalidad Mes × Año",
            Panel::Bars => "Barras apiladas",
            Panel::Distribution => "Distribución mensual",
            Panel::Anomalies => "Anomalías (z-score)",
            Panel::RealVsPredicted => "Real vs predicho",
            Panel::Performance => "Desempeño por horizonte",
            Panel::Metrics => "Tabla de métricas",
        }
    }
}

type CacheKey = (String, DateRange, Model);

/// Selection, range, window and threshold bits an anomaly scan was run with.
type AnomalyKey = (Vec<String>, Option<DateRange>, usize, u64);

/// Rolling z-score scan of the selected series over the selected range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyScan {
    /// Observed points per selected series, empty series left out.
    pub series: Vec<(String, Vec<(NaiveDate, f64)>)>,
    pub rows: Vec<AnomalyRow>,
    /// Distinct flagged dates, ascending.
    pub dates: Vec<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until a file is opened).
    pub table: Option<TimeSeriesTable>,
    pub source: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Selected series, in table column order.
    pub selected: Vec<String>,
    pub range: Option<DateRange>,
    pub frequency: Frequency,
    pub epoch: Epoch,
    pub models: BTreeSet<Model>,

    pub anomaly: AnomalyOptions,
    pub bars: BarOptions,
    pub distribution: DistributionKind,
    pub performance: PerformanceOptions,
    pub shared_heatmap_scale: bool,
    pub metrics_page: usize,
    pub hidden_panels: BTreeSet<Panel>,

    forecast_cache: HashMap<CacheKey, Result<Rc<ModelRun>, ForecastError>>,
    anomaly_cache: Option<(AnomalyKey, Rc<AnomalyScan>)>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl AppState {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            table: None,
            source: None,
            status_message: None,
            selected: Vec::new(),
            range: None,
            frequency: config.frequency,
            epoch: config.epoch,
            models: config.models.iter().copied().collect(),
            anomaly: AnomalyOptions {
                window: config.window,
                threshold: config.threshold,
                show_rolling_mean: true,
                page: 0,
            },
            bars: BarOptions {
                kind: PeriodKind::Year,
                mode: BarMode::Value,
                active_product: None,
            },
            distribution: DistributionKind::Box,
            performance: PerformanceOptions {
                metric: PerfMetric::Rmse,
                accumulated: false,
                smoothing: 0,
                residual_plot: ResidualPlot::Histogram,
            },
            shared_heatmap_scale: config.shared_heatmap_scale,
            metrics_page: 0,
            hidden_panels: BTreeSet::new(),
            forecast_cache: HashMap::new(),
            anomaly_cache: None,
        }
    }

    /// Current choices as a config to persist.
    pub fn to_config(&self) -> DashboardConfig {
        DashboardConfig {
            csv_path: self.source.clone(),
            window: self.anomaly.window,
            threshold: self.anomaly.threshold,
            frequency: self.frequency,
            epoch: self.epoch,
            models: self.models.iter().copied().collect(),
            shared_heatmap_scale: self.shared_heatmap_scale,
        }
    }

    /// Ingest a newly loaded table: select the first series and the full span.
    pub fn set_table(&mut self, table: TimeSeriesTable, source: Option<PathBuf>) {
        self.selected = table.columns.first().cloned().into_iter().collect();
        self.range = DateRange::full(&table);
        self.anomaly.page = 0;
        self.metrics_page = 0;
        self.bars.active_product = None;
        self.forecast_cache.clear();
        self.anomaly_cache = None;

        self.table = Some(table);
        self.source = source;
        self.status_message = None;
    }

    /// Load `path`, reporting failures in the status line.
    pub fn load_path(&mut self, path: &Path) -> bool {
        match crate::data::loader::load_file(path) {
            Ok(table) => {
                let span = table
                    .date_bounds()
                    .map(|(s, e)| format!("{s} .. {e}"))
                    .unwrap_or_default();
                log::info!(
                    "Loaded {} rows with columns {:?} ({span})",
                    table.len(),
                    table.columns
                );
                self.set_table(table, Some(path.to_path_buf()));
                true
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                false
            }
        }
    }

    // ---- Series selection ----

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    /// Flip one series, keeping the selection in column order.
    pub fn toggle_series(&mut self, name: &str) {
        let Some(table) = &self.table else {
            return;
        };
        let mut wanted: BTreeSet<&str> = self.selected.iter().map(String::as_str).collect();
        if !wanted.remove(name) {
            wanted.insert(name);
        }
        self.selected = table
            .columns
            .iter()
            .filter(|c| wanted.contains(c.as_str()))
            .cloned()
            .collect();
    }

    pub fn select_all(&mut self) {
        if let Some(table) = &self.table {
            self.selected = table.columns.clone();
        }
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// "Producto activo": a concrete product replaces the shared selection,
    /// `None` leaves it alone.
    pub fn set_active_product(&mut self, product: Option<String>) {
        if let Some(name) = &product {
            if self.table.as_ref().is_some_and(|t| t.column(name).is_some()) {
                self.selected = vec![name.clone()];
            }
        }
        self.bars.active_product = product;
    }

    // ---- Range ----

    /// Set the range, clamped to the data bounds. Fits for the previous
    /// range are dropped.
    pub fn set_range(&mut self, range: DateRange) {
        if let Some(bounds) = self.table.as_ref().and_then(|t| t.date_bounds()) {
            self.replace_range(Some(range.clamp_to(bounds)));
        }
    }

    pub fn reset_range(&mut self) {
        let full = self.table.as_ref().and_then(DateRange::full);
        self.replace_range(full);
    }

    fn replace_range(&mut self, range: Option<DateRange>) {
        if self.range != range {
            self.forecast_cache.clear();
        }
        self.range = range;
    }

    /// The table restricted to the selected date range.
    pub fn sliced(&self) -> Option<TimeSeriesTable> {
        let table = self.table.as_ref()?;
        Some(match &self.range {
            Some(r) => table.slice(r),
            None => table.clone(),
        })
    }

    // ---- Models ----

    pub fn toggle_model(&mut self, model: Model) {
        if !self.models.remove(&model) {
            self.models.insert(model);
        }
    }

    /// Fit `model` on the observed values of `series` over the selected
    /// range, reusing earlier fits. The fit lines up with
    /// `sliced().series(series)`.
    pub fn model_run(&mut self, series: &str, model: Model) -> Result<Rc<ModelRun>, ForecastError> {
        let range = self.range.ok_or(ForecastError::EmptyData)?;
        let key = (series.to_string(), range, model);
        if let Some(hit) = self.forecast_cache.get(&key) {
            return hit.clone();
        }

        log::debug!("forecast cache miss: {} on {series} {range:?}", model.label());
        let values: Vec<f64> = self
            .table
            .as_ref()
            .map(|t| t.slice(&range).series(series))
            .unwrap_or_default()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        let result = ModelRun::fit(model, &values).map(Rc::new);
        if let Err(e) = &result {
            log::debug!("{} unavailable for {series}: {e}", model.label());
        }
        self.forecast_cache.insert(key, result.clone());
        result
    }

    #[cfg(test)]
    pub fn cached_fits(&self) -> usize {
        self.forecast_cache.len()
    }

    // ---- Anomalies ----

    /// Anomaly scan for the current selection, range, window and threshold.
    /// Recomputed only when one of them changes.
    pub fn anomalies(&mut self) -> Rc<AnomalyScan> {
        let key: AnomalyKey = (
            self.selected.clone(),
            self.range,
            self.anomaly.window,
            self.anomaly.threshold.to_bits(),
        );
        if let Some((cached, scan)) = &self.anomaly_cache {
            if *cached == key {
                return Rc::clone(scan);
            }
        }

        let scan = Rc::new(self.scan_anomalies());
        log::debug!(
            "anomaly scan: {} rows on {} dates for {:?}",
            scan.rows.len(),
            scan.dates.len(),
            self.selected
        );
        self.anomaly_cache = Some((key, Rc::clone(&scan)));
        scan
    }

    fn scan_anomalies(&self) -> AnomalyScan {
        let Some(sub) = self.sliced() else {
            return AnomalyScan::default();
        };
        let series: Vec<(String, Vec<(NaiveDate, f64)>)> = self
            .selected
            .iter()
            .map(|name| (name.clone(), sub.series(name)))
            .filter(|(_, pts)| !pts.is_empty())
            .collect();
        let rows = anomaly_table(&series, self.anomaly.window, self.anomaly.threshold);
        let dates = unique_dates(&rows);
        AnomalyScan { series, rows, dates }
    }

    // ---- Panels ----

    pub fn is_visible(&self, panel: Panel) -> bool {
        !self.hidden_panels.contains(&panel)
    }

    pub fn set_visible(&mut self, panel: Panel, visible: bool) {
        if visible {
            self.hidden_panels.remove(&panel);
        } else {
            self.hidden_panels.insert(panel);
        }
    }
}
