use polars::prelude::*;

/// Rescales `series` to `[0, 1]` as `(x - min) / (max - min)`.
///
/// Nulls stay null. A constant column has a zero range and scales to NaN.
pub fn min_max_scaler(series: &Series) -> PolarsResult<Series> {
    let values = series.cast(&DataType::Float64)?;
    let values = values.f64()?;

    let (Some(min), Some(max)) = (values.min(), values.max()) else {
        return Ok(values.clone().into_series());
    };
    let range = max - min;

    let scaled: Float64Chunked = values
        .into_iter()
        .map(|value| value.map(|v| (v - min) / range))
        .collect();

    Ok(scaled.with_name(series.name().clone()).into_series())
}

/// Applies `ln(x + 1)` before min-max scaling, for long-tailed amounts.
pub fn log_min_max_scaler(series: &Series) -> PolarsResult<Series> {
    let values = series.cast(&DataType::Float64)?;
    let logged: Float64Chunked = values
        .f64()?
        .into_iter()
        .map(|value| value.map(|v| (v + 1.0).ln()))
        .collect();

    min_max_scaler(&logged.with_name(series.name().clone()).into_series())
}

/// Square root of the mean; `None` for an empty or all-null series.
pub fn root_mean(series: &Series) -> Option<f64> {
    series.mean().map(f64::sqrt)
}
