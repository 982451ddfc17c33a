use crate::report::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub provider: Option<String>,
    /// 0-based index of the row holding the question text.
    #[serde(rename = "headerRowIndex")]
    _header_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl InputSettings {
    pub fn header_row_index(&self) -> ReportResult<Option<usize>> {
        if self._header_row_index.is_some() {
            read_js_int(&self._header_row_index).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "createDirectory")]
    pub create_directory: Option<bool>,
    pub overwrite: Option<bool>,
    #[serde(rename = "writeDataFiles")]
    pub write_data_files: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FieldMappingSettings {
    #[serde(rename = "fieldId")]
    pub field_id: String,
    pub course: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnRuleSettings {
    pub contains: Option<Vec<String>>,
    #[serde(rename = "fieldMappings")]
    pub field_mappings: Option<Vec<FieldMappingSettings>>,
}

impl ColumnRuleSettings {
    /// The rule, with the missing parts taken from `default`.
    fn column_rule(&self, default: &ColumnRule) -> ColumnRule {
        ColumnRule {
            contains: self
                .contains
                .clone()
                .unwrap_or_else(|| default.contains.clone()),
            field_mappings: match &self.field_mappings {
                Some(fms) => fms
                    .iter()
                    .map(|fm| FieldMapping {
                        field_id: fm.field_id.clone(),
                        course: match fm.course.clone() {
                            Some(x) if x.is_empty() => None,
                            x => x,
                        },
                    })
                    .collect(),
                None => default.field_mappings.clone(),
            },
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    pub core: Option<ColumnRuleSettings>,
    pub elective: Option<ColumnRuleSettings>,
    #[serde(rename = "courseNameSeparator")]
    pub course_name_separator: Option<String>,
    #[serde(rename = "undefinedMeans")]
    pub undefined_means: Option<String>,
}

impl RulesSettings {
    pub fn survey_rules(&self) -> ReportResult<SurveyRules> {
        let default = SurveyRules::default();
        let undefined_means = match self.undefined_means.as_deref() {
            None | Some("last") => UndefinedMeanOrder::Last,
            Some("first") => UndefinedMeanOrder::First,
            Some(x) => whatever!("unknown undefinedMeans option: {:?}", x),
        };
        Ok(SurveyRules {
            core: match &self.core {
                Some(c) => c.column_rule(&default.core),
                None => default.core.clone(),
            },
            elective: match &self.elective {
                Some(c) => c.column_rule(&default.elective),
                None => default.elective.clone(),
            },
            course_name_separator: self
                .course_name_separator
                .clone()
                .unwrap_or(default.course_name_separator),
            undefined_means,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "inputSettings")]
    pub input_settings: Option<InputSettings>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    pub rules: Option<RulesSettings>,
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

fn read_js_int(x: &Option<JSValue>) -> ReportResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}
