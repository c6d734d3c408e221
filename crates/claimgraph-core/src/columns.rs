use polars::prelude::*;

/// Lowercases the first character of `name` and strips every underscore, so
/// `ChronicCond_Alzheimer` becomes `chronicCondAlzheimer` and `DOB` becomes `dOB`.
///
/// Underscores are removed before lowercasing so a leading underscore never
/// shields the first letter; this keeps the function idempotent.
pub fn lower_first_and_remove_underscores(name: &str) -> String {
    let mut chars = name.chars().filter(|c| *c != '_');
    let Some(first) = chars.next() else {
        return String::new();
    };

    first.to_lowercase().chain(chars).collect()
}

/// Returns a copy of `df` with every column renamed through `rename`.
pub fn rename_columns<F>(df: &DataFrame, rename: F) -> PolarsResult<DataFrame>
where
    F: Fn(&str) -> String,
{
    let new_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| rename(name.as_str()))
        .collect();

    let mut renamed = df.clone();
    renamed.set_column_names(new_names.iter().map(String::as_str))?;
    Ok(renamed)
}

pub fn normalize_column_names(df: &DataFrame) -> PolarsResult<DataFrame> {
    rename_columns(df, lower_first_and_remove_underscores)
}
