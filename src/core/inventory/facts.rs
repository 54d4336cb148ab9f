use crate::core::query::{QueryExecutor, QueryTarget, ScalarValue};

/// How a raw scalar turns into a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactKind {
    Text,
    Count,
    SsisFlag,
    SsrsFlag,
    SizePages,
}

/// One database-engine fact: a label, the scalar query that produces it,
/// and the rendering applied to the result.
#[derive(Debug, Clone, Copy)]
pub struct EngineFact {
    pub label: &'static str,
    pub sql: &'static str,
    pub kind: FactKind,
}

/// The six engine facts of the inventory report, in report order.
pub const ENGINE_FACTS: [EngineFact; 6] = [
    EngineFact {
        label: "Edition",
        sql: "SELECT CAST(SERVERPROPERTY('Edition') AS nvarchar(128))",
        kind: FactKind::Text,
    },
    EngineFact {
        label: "Product version",
        sql: "SELECT CAST(SERVERPROPERTY('ProductVersion') AS nvarchar(128))",
        kind: FactKind::Text,
    },
    EngineFact {
        label: "User databases",
        sql: "SELECT COUNT(*) FROM sys.databases WHERE database_id > 4",
        kind: FactKind::Count,
    },
    EngineFact {
        label: "Integration Services",
        sql: "SELECT COUNT(*) FROM msdb.sys.objects WHERE name = N'sysssispackages'",
        kind: FactKind::SsisFlag,
    },
    EngineFact {
        label: "Reporting Services",
        sql: "SELECT CASE WHEN DB_ID(N'ReportServer') IS NULL THEN 0 ELSE 1 END",
        kind: FactKind::SsrsFlag,
    },
    EngineFact {
        label: "Combined database size",
        sql: "SELECT SUM(CAST(size AS float)) FROM sys.master_files",
        kind: FactKind::SizePages,
    },
];

/// Database files report their size in 8 KB pages.
pub fn pages_to_gib(pages: f64) -> f64 {
    pages * 8.0 / 1024.0 / 1024.0
}

/// Render a scalar according to the fact kind.
pub fn render_fact(kind: FactKind, value: &ScalarValue) -> String {
    match kind {
        FactKind::Text => value.to_string(),
        FactKind::Count => match value.as_i64() {
            Some(n) => format!("{}", n),
            None => value.to_string(),
        },
        FactKind::SsisFlag => flag_sentence(value, "Integration Services (SSIS)"),
        FactKind::SsrsFlag => flag_sentence(value, "Reporting Services (SSRS)"),
        FactKind::SizePages => match value.as_f64() {
            Some(pages) => format!("{:.2} GiB across all database files", pages_to_gib(pages)),
            None => "unavailable (size query returned no value)".to_string(),
        },
    }
}

fn flag_sentence(value: &ScalarValue, component: &str) -> String {
    match value.as_i64() {
        Some(n) if n != 0 => format!("{} is installed on this instance.", component),
        Some(_) => format!("{} is not installed on this instance.", component),
        None => format!("unavailable ({} flag returned no value)", component),
    }
}

/// Run all six fact queries sequentially, recording per-fact failures as
/// "unavailable" lines instead of aborting; the inventory is best-effort
/// diagnostic context.
pub fn collect_engine_facts(
    executor: &dyn QueryExecutor,
    target: &QueryTarget,
) -> Vec<(&'static str, String)> {
    ENGINE_FACTS
        .iter()
        .map(|fact| {
            let rendered = match executor.execute_scalar(target, fact.sql) {
                Ok(value) => render_fact(fact.kind, &value),
                Err(e) => {
                    log::warn!("engine fact '{}' unavailable: {}", fact.label, e);
                    format!("unavailable ({})", e)
                }
            };
            (fact.label, rendered)
        })
        .collect()
}
