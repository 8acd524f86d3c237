//! # SQL Application Configuration
//!
//! Input, outputs and reference data source of a `SQL-1_0` application.
//! The remote API can add and update an input but never delete one; outputs
//! can be added and deleted but never updated.

use super::enums::{InputStartingPosition, RecordFormatType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SqlApplicationConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Input>,
    /// A set: order carries no meaning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Output>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_data_source: Option<ReferenceDataSource>,
}

impl SqlApplicationConfiguration {
    #[must_use]
    pub fn definition(&self) -> Self {
        let mut outputs: Vec<Output> = self.outputs.iter().map(Output::definition).collect();
        outputs.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            input: self.input.as_ref().map(Input::definition),
            outputs,
            reference_data_source: self
                .reference_data_source
                .as_ref()
                .map(ReferenceDataSource::definition),
        }
    }
}

/// ARN of a Kinesis stream, Firehose delivery stream or Lambda function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceArn {
    pub resource_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Input {
    pub name_prefix: String,
    pub input_schema: SourceSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_parallelism: Option<InputParallelism>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_processing_configuration: Option<InputProcessingConfiguration>,
    /// Used when the application is started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_starting_position_configuration: Option<InputStartingPositionConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinesis_firehose_input: Option<ResourceArn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinesis_streams_input: Option<ResourceArn>,
    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_id: Option<String>,
    /// Computed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_app_stream_names: Vec<String>,
}

impl Input {
    #[must_use]
    pub fn definition(&self) -> Self {
        Self {
            input_id: None,
            in_app_stream_names: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InputParallelism {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InputProcessingConfiguration {
    pub input_lambda_processor: ResourceArn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InputStartingPositionConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_starting_position: Option<InputStartingPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceSchema {
    pub record_columns: Vec<RecordColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_encoding: Option<String>,
    pub record_format: RecordFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordColumn {
    pub name: String,
    pub sql_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordFormat {
    pub record_format_type: RecordFormatType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_parameters: Option<MappingParameters>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MappingParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_mapping_parameters: Option<CsvMappingParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_mapping_parameters: Option<JsonMappingParameters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CsvMappingParameters {
    pub record_column_delimiter: String,
    pub record_row_delimiter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JsonMappingParameters {
    pub record_row_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Output {
    /// In-application stream name
    pub name: String,
    pub destination_schema: DestinationSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinesis_firehose_output: Option<ResourceArn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinesis_streams_output: Option<ResourceArn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_output: Option<ResourceArn>,
    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_id: Option<String>,
}

impl Output {
    #[must_use]
    pub fn definition(&self) -> Self {
        Self {
            output_id: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DestinationSchema {
    pub record_format_type: RecordFormatType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceDataSource {
    pub table_name: String,
    pub reference_schema: SourceSchema,
    pub s3_reference_data_source: S3ReferenceDataSource,
    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

impl ReferenceDataSource {
    #[must_use]
    pub fn definition(&self) -> Self {
        Self {
            reference_id: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct S3ReferenceDataSource {
    pub bucket_arn: String,
    pub file_key: String,
}
