//! Field transcoding between declarative specs and API payloads.
//!
//! `expand_*` builds the nested payload the API expects; `flatten_*` turns an API response
//! back into the declarative shape. The only lossy step is option parameter typing: every
//! declared parameter is a string, and each one is sent as a JSON number only when the API's
//! metadata says that position is an integer *and* the text parses as one.

use crate::api::{
    ApiError, ConfigOption, EnvironmentVariable, ParamValue, ParameterMetadata, ProtocolSet,
    StreamingProfile,
};
use crate::model::{BitrateProfile, EnvVar, OptionSpec, ProtocolSetSpec};
use std::collections::BTreeSet;
use tracing::debug;

/// Decides how one parameter is sent, given the metadata lookup for its position.
///
/// A failed lookup is treated as "not an integer".
pub fn resolve_param_type(lookup: Result<bool, ApiError>, raw: &str) -> ParamValue {
    match lookup {
        Ok(true) => raw
            .parse::<i64>()
            .map(ParamValue::Int)
            .unwrap_or_else(|_| ParamValue::Str(raw.to_string())),
        _ => ParamValue::Str(raw.to_string()),
    }
}

pub async fn expand_option_parameters<M: ParameterMetadata + ?Sized>(
    metadata: &M,
    shortname: &str,
    service_profile: &str,
    option: &str,
    parameters: &[String],
) -> Vec<ParamValue> {
    let mut expanded = Vec::with_capacity(parameters.len());
    for (position, raw) in parameters.iter().enumerate() {
        let lookup = metadata
            .is_parameter_integer(shortname, service_profile, option, position)
            .await;
        if let Err(e) = &lookup {
            debug!(
                option,
                position,
                error = %e,
                "Parameter metadata unavailable; sending as string"
            );
        }
        expanded.push(resolve_param_type(lookup, raw));
    }
    expanded
}

pub async fn expand_options<M: ParameterMetadata + ?Sized>(
    metadata: &M,
    shortname: &str,
    service_profile: &str,
    options: &[OptionSpec],
) -> Vec<ConfigOption> {
    let mut expanded = Vec::with_capacity(options.len());
    for option in options {
        expanded.push(ConfigOption {
            name: option.name.clone(),
            parameters: expand_option_parameters(
                metadata,
                shortname,
                service_profile,
                &option.name,
                &option.parameters,
            )
            .await,
        });
    }
    expanded
}

/// Protocol sets keep their order. A declared source port of `0` is left out of the payload.
pub async fn expand_protocol_sets<M: ParameterMetadata + ?Sized>(
    metadata: &M,
    shortname: &str,
    service_profile: &str,
    sets: &[ProtocolSetSpec],
) -> Vec<ProtocolSet> {
    let mut expanded = Vec::with_capacity(sets.len());
    for set in sets {
        expanded.push(ProtocolSet {
            published_protocol: set.published_protocol.clone(),
            source_protocol: set.source_protocol.clone(),
            source_port: set.source_port.filter(|port| *port != 0),
            options: expand_options(metadata, shortname, service_profile, &set.options).await,
        });
    }
    expanded
}

pub fn flatten_options(options: &[ConfigOption]) -> Vec<OptionSpec> {
    options
        .iter()
        .map(|option| OptionSpec {
            name: option.name.clone(),
            parameters: option.parameters.iter().map(ToString::to_string).collect(),
        })
        .collect()
}

pub fn flatten_protocol_sets(sets: &[ProtocolSet]) -> Vec<ProtocolSetSpec> {
    sets.iter()
        .map(|set| ProtocolSetSpec {
            published_protocol: set.published_protocol.clone(),
            source_protocol: set.source_protocol.clone(),
            source_port: set.source_port,
            options: flatten_options(&set.options),
        })
        .collect()
}

pub fn expand_env_vars(vars: &BTreeSet<EnvVar>) -> Vec<EnvironmentVariable> {
    vars.iter()
        .map(|var| EnvironmentVariable {
            name: var.name.clone(),
            value: var.value.clone(),
        })
        .collect()
}

pub fn flatten_env_vars(vars: &[EnvironmentVariable]) -> BTreeSet<EnvVar> {
    vars.iter()
        .map(|var| EnvVar::new(&var.name, &var.value))
        .collect()
}

pub fn expand_profiles(profiles: &BTreeSet<BitrateProfile>) -> Vec<StreamingProfile> {
    profiles
        .iter()
        .map(|p| StreamingProfile {
            video_bitrate: p.video_bitrate,
            audio_bitrate: p.audio_bitrate,
        })
        .collect()
}

pub fn flatten_profiles(profiles: &[StreamingProfile]) -> BTreeSet<BitrateProfile> {
    profiles
        .iter()
        .map(|p| BitrateProfile {
            video_bitrate: p.video_bitrate,
            audio_bitrate: p.audio_bitrate,
        })
        .collect()
}
