//! End-to-end lifecycle tests on synthetic daily climate data.

use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime};
use climate_fcst_core::{
    ForecastError, Frequency, ModelConfig, Order, SarimaxModel, SeasonalOrder, TimeFrame,
};

/// Deterministic pseudo-random noise in [-0.5, 0.5).
fn noise(i: usize) -> f64 {
    let x = ((i as f64 + 1.0) * 12.9898).sin() * 43758.5453;
    x - x.floor() - 0.5
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn days_from(first: NaiveDateTime, n: usize) -> Vec<NaiveDateTime> {
    (0..n)
        .map(|k| Frequency::Daily.advance(first, k).unwrap())
        .collect()
}

fn humidity(i: usize) -> f64 {
    60.0 + 10.0 * (i as f64 * 0.3).cos() + 2.0 * noise(i + 1000)
}

fn meantemp(i: usize) -> f64 {
    let seasonal = 4.0 * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin();
    15.0 + 0.05 * i as f64 + seasonal - 0.1 * humidity(i) + 0.3 * noise(i)
}

/// `n_train` historical rows plus `n_future` future exogenous rows.
fn climate_tables(n_train: usize, n_future: usize) -> (TimeFrame, TimeFrame, TimeFrame) {
    let index = days_from(start(), n_train);
    let endog = TimeFrame::new(
        index.clone(),
        vec![("meantemp".into(), (0..n_train).map(meantemp).collect())],
    )
    .unwrap();
    let exog = TimeFrame::new(
        index,
        vec![("humidity".into(), (0..n_train).map(humidity).collect())],
    )
    .unwrap();
    let future = TimeFrame::new(
        days_from(Frequency::Daily.advance(start(), n_train).unwrap(), n_future),
        vec![(
            "humidity".into(),
            (n_train..n_train + n_future).map(humidity).collect(),
        )],
    )
    .unwrap();
    (endog, exog, future)
}

fn weekly_model(n_train: usize, n_future: usize) -> SarimaxModel {
    let (endog, exog, future) = climate_tables(n_train, n_future);
    SarimaxModel::new(
        "meantemp",
        &endog,
        exog,
        future,
        Order::new(1, 1, 1).unwrap(),
        SeasonalOrder::new(1, 1, 1, 7).unwrap(),
        Frequency::Daily,
    )
    .unwrap()
}

#[test]
fn test_weekly_scenario_dates_follow_training_index() {
    let mut model = weekly_model(100, 7);
    model.train().unwrap();

    let forecast = model.forecast(7).unwrap();
    assert_eq!(forecast.len(), 7);
    assert_eq!(forecast.feature, "meantemp");

    let last_train = Frequency::Daily.advance(start(), 99).unwrap();
    let expected: Vec<_> = (1..=7)
        .map(|k| Frequency::Daily.advance(last_train, k).unwrap())
        .collect();
    assert_eq!(forecast.index, expected);
    assert!(forecast.point.iter().all(|v| v.is_finite()));
}

#[test]
fn test_forecast_before_train_is_invalid_state() {
    let mut model = weekly_model(100, 7);
    match model.forecast(7) {
        Err(ForecastError::InvalidState {
            operation, actual, ..
        }) => {
            assert_eq!(operation, "forecast");
            assert_eq!(actual, "configured");
        }
        other => panic!("expected InvalidState, got {:?}", other),
    }
}

#[test]
fn test_future_rows_shortfall() {
    let mut model = weekly_model(100, 3);
    model.train().unwrap();

    assert_eq!(model.forecast(3).unwrap().len(), 3);
    assert!(matches!(
        model.forecast(4),
        Err(ForecastError::ExogenousMismatch(_))
    ));
    // The earlier forecast is still held
    assert_eq!(model.last_forecast().map(|f| f.len()), Some(3));
}

#[test]
fn test_future_rows_must_follow_training_index() {
    let (endog, exog, _) = climate_tables(100, 0);
    let late = TimeFrame::new(
        days_from(Frequency::Daily.advance(start(), 102).unwrap(), 7),
        vec![("humidity".into(), vec![60.0; 7])],
    )
    .unwrap();
    let mut model = SarimaxModel::new(
        "meantemp",
        &endog,
        exog,
        late,
        Order::new(1, 1, 1).unwrap(),
        SeasonalOrder::new(1, 1, 1, 7).unwrap(),
        Frequency::Daily,
    )
    .unwrap();
    model.train().unwrap();
    assert!(matches!(
        model.forecast(7),
        Err(ForecastError::ExogenousMismatch(_))
    ));
}

#[test]
fn test_repeated_forecasts_are_identical() {
    let mut model = weekly_model(100, 7);
    model.train().unwrap();
    let first = model.forecast(7).unwrap().clone();
    let second = model.forecast(7).unwrap().clone();
    assert_eq!(first, second);
}

#[test]
fn test_seasonal_trend_accuracy() {
    let n = 140;
    let index = days_from(start(), n);
    let truth = |i: usize| {
        20.0 + 0.05 * i as f64 + 5.0 * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin()
    };
    let values: Vec<f64> = (0..n).map(|i| truth(i) + 0.3 * noise(i)).collect();
    let endog = TimeFrame::new(index.clone(), vec![("meantemp".into(), values)]).unwrap();

    let mut model = SarimaxModel::new(
        "meantemp",
        &endog,
        TimeFrame::empty(index),
        TimeFrame::empty(vec![]),
        Order::new(1, 1, 1).unwrap(),
        SeasonalOrder::new(0, 1, 1, 7).unwrap(),
        Frequency::Daily,
    )
    .unwrap();
    model.train().unwrap();

    let forecast = model.forecast(5).unwrap();
    for (h, value) in forecast.point.iter().enumerate() {
        let err = (value - truth(n + h)).abs();
        assert!(err < 1.5, "step {} off by {}", h + 1, err);
    }
}

#[test]
fn test_intervals_bracket_point_forecast() {
    let mut model = weekly_model(100, 7);
    model.train().unwrap();
    let point = model.forecast(7).unwrap().point.clone();

    let forecast = model.forecast_with_intervals(7, 0.9).unwrap();
    let intervals = forecast.intervals.as_ref().unwrap();
    assert_relative_eq!(intervals.level, 0.9);
    for h in 0..7 {
        assert_relative_eq!(forecast.point[h], point[h], epsilon = 1e-12);
        assert!(intervals.lower[h] < point[h]);
        assert!(point[h] < intervals.upper[h]);
    }
}

#[test]
fn test_from_config_reuses_pdq_for_seasonal_part() {
    let (endog, exog, future) = climate_tables(100, 7);
    let config = ModelConfig {
        clear: false,
        n_steps: 7,
        feature: "meantemp".into(),
        pdq: [1, 1, 1],
        seasonality: 7,
        seasonal_pdq: None,
        freq: "d".into(),
    };
    let model = SarimaxModel::from_config(&config, &endog, exog, future).unwrap();
    assert_eq!(
        model.spec().seasonal_order,
        SeasonalOrder::new(1, 1, 1, 7).unwrap()
    );

    let missing = ModelConfig {
        feature: "rainfall".into(),
        ..config
    };
    let (endog, exog, future) = climate_tables(100, 7);
    assert!(matches!(
        SarimaxModel::from_config(&missing, &endog, exog, future),
        Err(ForecastError::Configuration(_))
    ));
}

#[test]
fn test_too_short_series_fails_training() {
    let mut model = weekly_model(15, 7);
    assert!(matches!(model.train(), Err(ForecastError::ModelFit(_))));
    assert_eq!(model.state_name(), "configured");
}

#[test]
fn test_monthly_forecast_keeps_day_of_month() {
    let first = NaiveDate::from_ymd_opt(2021, 1, 28)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let months = |from: usize, n: usize| -> Vec<NaiveDateTime> {
        (from..from + n)
            .map(|k| Frequency::Monthly.advance(first, k).unwrap())
            .collect()
    };
    let rainfall = |i: usize| 50.0 + 20.0 * (i as f64 * 0.5).sin();

    let index = months(0, 26);
    assert_eq!(
        index[25].date(),
        NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
    );
    let endog = TimeFrame::new(
        index.clone(),
        vec![(
            "meantemp".into(),
            (0..26).map(|i| 18.0 + 0.05 * rainfall(i) + noise(i)).collect(),
        )],
    )
    .unwrap();
    let exog = TimeFrame::new(
        index,
        vec![("rainfall".into(), (0..26).map(rainfall).collect())],
    )
    .unwrap();
    let future = TimeFrame::new(
        months(26, 2),
        vec![("rainfall".into(), (26..28).map(rainfall).collect())],
    )
    .unwrap();

    let mut model = SarimaxModel::new(
        "meantemp",
        &endog,
        exog,
        future,
        Order::new(1, 0, 0).unwrap(),
        SeasonalOrder::none(),
        Frequency::Monthly,
    )
    .unwrap();
    model.train().unwrap();

    let forecast = model.forecast(2).unwrap();
    let dates: Vec<_> = forecast.index.iter().map(|ts| ts.date()).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2023, 3, 28).unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 28).unwrap(),
        ]
    );
}
