// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema and content hashes

use super::Statement;
use crate::primitive::Primitive;
use sha2::{Digest, Sha256};

// Hex encoding helper
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn digest(parts: &[String]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\n");
    }
    let result = hasher.finalize();
    // First 32 chars of hex digest
    hex_encode(&result[..16])
}

fn sorted<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = names.collect();
    names.sort_unstable();
    names.join(",")
}

pub(super) fn schema_hash(statement: &Statement) -> String {
    digest(&[
        format!("r:{}", statement.registry().uri()),
        format!("p:{}", sorted(statement.parameter_names())),
        format!("r:{}", sorted(statement.result_column_names())),
    ])
}

pub(super) fn mpcv_hash(statement: &Statement) -> String {
    let mut parameters: Vec<String> = statement
        .parameters()
        .map(|p| {
            format!(
                "{}={}:{}",
                p.name(),
                p.constraint(),
                Primitive::unparse(p.value())
            )
        })
        .collect();
    parameters.sort_unstable();

    let mut metadata: Vec<String> = statement
        .metadata()
        .map(|m| format!("{}={}", m.name(), m.value()))
        .collect();
    metadata.sort_unstable();

    digest(&[
        format!("v:{}", statement.verb()),
        format!("w:{}", statement.when()),
        format!("p:{}", parameters.join(",")),
        format!("m:{}", metadata.join(",")),
        format!("r:{}", sorted(statement.result_column_names())),
        format!("e:{}", statement.export().unwrap_or("")),
    ])
}

pub(super) fn retoken(statement: &Statement, tzero: &str) -> String {
    digest(&[mpcv_hash(statement), format!("t:{}", tzero)])
}
