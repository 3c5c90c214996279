//! Adapter source selection and repackaging.
//!
//! The renderer ships adapter sources for every supported ecosystem side by
//! side. A standalone export must carry exactly one ecosystem's sources, the
//! shared library modules, and an index rewritten to mention only that
//! ecosystem. This module owns that selection.
//!
//! The per-ecosystem file registry is derived from the source table once per
//! process; concurrent first callers share a single build through
//! [`tokio::sync::OnceCell`].

use std::collections::BTreeMap;

use formpack_util::case::pascal_case;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::error::ExportError;
use crate::filemap::FileMap;

use super::deps::RENDERER_PACKAGE;

/// Content-set path of the shared contract schema types.
pub const SCHEMA_SOURCE: &str = "lib/contract-schema.ts";
/// Content-set path of the shared utility module.
pub const UTILS_SOURCE: &str = "lib/utils.ts";
/// Content-set path of the canonical multi-ecosystem adapter index.
pub const INDEX_SOURCE: &str = "adapters/index.ts";
/// Name of the shared capability interface every adapter implements.
pub const ADAPTER_INTERFACE: &str = "ContractAdapter";

/// Path segment that roots per-ecosystem adapter sources.
const ADAPTERS_SEGMENT: &str = "adapters";
/// File name of an ecosystem's primary adapter module.
const PRIMARY_ADAPTER_FILE: &str = "adapter.ts";
/// Sibling modules collected alongside the primary adapter when present.
const SIBLING_FILES: &[&str] = &["types.ts", "utils.ts"];

/// Ecosystem id to the content-set paths its export needs, sorted by id.
pub type AdapterFileRegistry = BTreeMap<String, Vec<String>>;

/// Selects and repackages adapter sources for standalone export.
#[derive(Debug)]
pub struct AdapterAssembler {
    /// Already-resolved source table (content-set path to file text).
    sources: BTreeMap<String, String>,
    registry: OnceCell<AdapterFileRegistry>,
}

impl AdapterAssembler {
    #[must_use]
    pub fn new(sources: BTreeMap<String, String>) -> Self {
        Self {
            sources,
            registry: OnceCell::new(),
        }
    }

    /// Ecosystem ids the registry knows, in sorted order.
    pub async fn ecosystems(&self) -> Vec<String> {
        self.registry().await.keys().cloned().collect()
    }

    /// Whether adapter files can be assembled for `ecosystem`.
    pub async fn supports(&self, ecosystem: &str) -> bool {
        self.registry().await.contains_key(ecosystem)
    }

    /// Assemble the source files one ecosystem's export needs into `files`.
    ///
    /// Deterministic and idempotent: repeated calls stage byte-identical
    /// entries at identical paths.
    ///
    /// # Errors
    /// - [`crate::error::codes::EXPORT_UNSUPPORTED_ECOSYSTEM`] when the
    ///   registry has no entry for `ecosystem`
    /// - [`crate::error::codes::EXPORT_CORE_SOURCE_MISSING`] when a shared
    ///   library source is absent from the source table
    /// - [`crate::error::codes::EXPORT_INDEX_PARSE_FAILED`] when the
    ///   canonical index cannot be reduced to a single-ecosystem index
    pub async fn files_for(
        &self,
        ecosystem: &str,
        files: &mut FileMap,
    ) -> Result<(), ExportError> {
        let registry = self.registry().await;
        let Some(paths) = registry.get(ecosystem) else {
            return Err(ExportError::unsupported_ecosystem(ecosystem));
        };

        for shared in [SCHEMA_SOURCE, UTILS_SOURCE] {
            let content = self.core_source(shared)?;
            files.insert(format!("src/{shared}"), content.into());
        }

        // Ecosystem sources are flattened under one directory; sibling
        // modules import each other relatively, so the layout holds.
        for path in paths {
            let content = self.core_source(path)?;
            let name = basename(path);
            files.insert(format!("src/adapters/{ecosystem}/{name}"), content.into());
        }

        let index = filter_index(self.core_source(INDEX_SOURCE)?, ecosystem)?;
        files.insert("src/adapters/index.ts".to_string(), index.into());

        Ok(())
    }

    async fn registry(&self) -> &AdapterFileRegistry {
        self.registry
            .get_or_init(|| async { build_registry(&self.sources) })
            .await
    }

    fn core_source(&self, path: &str) -> Result<&str, ExportError> {
        self.sources
            .get(path)
            .map(String::as_str)
            .ok_or_else(|| ExportError::core_source_missing(path))
    }
}

/// Scan the source table and group adapter files by ecosystem id.
///
/// Only ids with a primary `adapter.ts` are registered; the primary file
/// comes first in each entry, followed by any sibling modules.
fn build_registry(sources: &BTreeMap<String, String>) -> AdapterFileRegistry {
    let mut registry = AdapterFileRegistry::new();

    for path in sources.keys() {
        let Some(id) = ecosystem_segment(path) else {
            continue;
        };
        if registry.contains_key(id) {
            continue;
        }

        let primary = format!("{ADAPTERS_SEGMENT}/{id}/{PRIMARY_ADAPTER_FILE}");
        if !sources.contains_key(&primary) {
            debug!(ecosystem = id, "no primary adapter module; not registering");
            continue;
        }

        let mut entry = vec![primary];
        for sibling in SIBLING_FILES {
            let sibling_path = format!("{ADAPTERS_SEGMENT}/{id}/{sibling}");
            if sources.contains_key(&sibling_path) {
                entry.push(sibling_path);
            }
        }
        registry.insert(id.to_string(), entry);
    }

    if registry.is_empty() {
        error!("adapter source registry is empty; no ecosystem can be exported");
    } else {
        debug!(ecosystems = registry.len(), "adapter file registry built");
    }
    registry
}

/// Ecosystem id of a nested adapter path (`adapters/<id>/<file>`).
///
/// Files directly under `adapters/` (the index) carry no id.
fn ecosystem_segment(path: &str) -> Option<&str> {
    let mut parts = path.split('/');
    if parts.next()? != ADAPTERS_SEGMENT {
        return None;
    }
    let id = parts.next()?;
    parts.next().map(|_| id)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Reduce the canonical multi-ecosystem index to a single-ecosystem index.
///
/// Keeps the renderer-package imports and the type-only schema import,
/// extracts the complete [`ADAPTER_INTERFACE`] block, and generates the
/// import and re-export for the one surviving adapter class.
fn filter_index(source: &str, ecosystem: &str) -> Result<String, ExportError> {
    let class_name = format!("{}Adapter", pascal_case(ecosystem));

    let mut out = String::new();
    for statement in import_statements(source) {
        let keep = references_module(&statement, RENDERER_PACKAGE)
            || (statement.trim_start().starts_with("import type")
                && statement.contains("contract-schema"));
        if keep {
            out.push_str(&statement);
            out.push('\n');
        }
    }
    out.push_str(&format!(
        "import {{ {class_name} }} from './{ecosystem}/adapter';\n"
    ));
    out.push('\n');

    out.push_str(interface_block(source)?);
    out.push('\n');
    out.push('\n');

    out.push_str(&format!("export {{ {class_name} }};\n"));
    Ok(out)
}

/// Collect complete import statements, including ones spanning lines.
fn import_statements(source: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current: Option<String> = None;

    for line in source.lines() {
        if current.is_none() && line.trim_start().starts_with("import") {
            current = Some(String::new());
        }
        if let Some(buf) = current.as_mut() {
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str(line);
            if line.contains(';') {
                if let Some(done) = current.take() {
                    statements.push(done);
                }
            }
        }
    }

    statements
}

/// Whether an import statement names `module` (or a subpath of it) as its
/// specifier.
fn references_module(statement: &str, module: &str) -> bool {
    for quote in ['\'', '"'] {
        let needle = format!("{quote}{module}");
        if let Some(idx) = statement.find(&needle) {
            let rest = &statement[idx + needle.len()..];
            if rest.starts_with(quote) || rest.starts_with('/') {
                return true;
            }
        }
    }
    false
}

/// Extract the [`ADAPTER_INTERFACE`] declaration with its full body.
///
/// The body is delimited by counting nested brace pairs from the opening
/// brace until balance returns to zero.
fn interface_block(source: &str) -> Result<&str, ExportError> {
    let header = format!("export interface {ADAPTER_INTERFACE}");
    let Some(start) = source.find(&header) else {
        return Err(ExportError::index_parse_failed(format!(
            "canonical adapter index declares no `interface {ADAPTER_INTERFACE}`"
        )));
    };

    let Some(open_offset) = source[start..].find('{') else {
        return Err(ExportError::index_parse_failed(format!(
            "`interface {ADAPTER_INTERFACE}` has no body"
        )));
    };
    let open = start + open_offset;

    let mut depth = 0usize;
    for (offset, ch) in source[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&source[start..=open + offset]);
                }
            }
            _ => {}
        }
    }

    Err(ExportError::index_parse_failed(format!(
        "`interface {ADAPTER_INTERFACE}` body is unterminated"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;

    const INDEX_FIXTURE: &str = r"import { FormRenderer, registerAdapter } from '@formpack/renderer';
import type { ContractSchema, FunctionParam } from '../lib/contract-schema';
import { EvmAdapter } from './evm/adapter';
import { SolanaAdapter } from './solana/adapter';

export interface ContractAdapter {
  readonly ecosystem: string;
  loadContract(address: string): Promise<ContractSchema>;
  signAndSend(tx: { payload: unknown }): Promise<string>;
  mapParameterType(param: FunctionParam): string;
}

export const adapters = {
  evm: EvmAdapter,
  solana: SolanaAdapter,
};

export { EvmAdapter, SolanaAdapter };
";

    fn sources_fixture() -> BTreeMap<String, String> {
        let mut sources = BTreeMap::new();
        sources.insert(
            SCHEMA_SOURCE.to_string(),
            "export interface ContractSchema {}\n".to_string(),
        );
        sources.insert(
            UTILS_SOURCE.to_string(),
            "export const noop = () => {};\n".to_string(),
        );
        sources.insert(INDEX_SOURCE.to_string(), INDEX_FIXTURE.to_string());
        sources.insert(
            "adapters/evm/adapter.ts".to_string(),
            "export class EvmAdapter {}\n".to_string(),
        );
        sources.insert(
            "adapters/evm/types.ts".to_string(),
            "export type EvmAddress = `0x${string}`;\n".to_string(),
        );
        sources.insert(
            "adapters/solana/adapter.ts".to_string(),
            "export class SolanaAdapter {}\n".to_string(),
        );
        // A stray directory without a primary adapter module
        sources.insert(
            "adapters/drafts/types.ts".to_string(),
            "export {};\n".to_string(),
        );
        sources
    }

    #[tokio::test]
    async fn test_registry_requires_primary_adapter() {
        let assembler = AdapterAssembler::new(sources_fixture());

        assert_eq!(assembler.ecosystems().await, vec!["evm", "solana"]);
        assert!(assembler.supports("evm").await);
        assert!(!assembler.supports("drafts").await);
    }

    #[tokio::test]
    async fn test_files_for_unknown_ecosystem_fails() {
        let assembler = AdapterAssembler::new(sources_fixture());
        let mut files = FileMap::new();

        let err = assembler.files_for("dogecoin", &mut files).await.unwrap_err();
        assert_eq!(err.code(), codes::EXPORT_UNSUPPORTED_ECOSYSTEM);
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_files_for_missing_shared_source_fails() {
        let mut sources = sources_fixture();
        sources.remove(SCHEMA_SOURCE);
        let assembler = AdapterAssembler::new(sources);
        let mut files = FileMap::new();

        let err = assembler.files_for("evm", &mut files).await.unwrap_err();
        assert_eq!(err.code(), codes::EXPORT_CORE_SOURCE_MISSING);
        assert!(err.message().contains(SCHEMA_SOURCE));
    }

    #[tokio::test]
    async fn test_files_for_selects_one_ecosystem() {
        let assembler = AdapterAssembler::new(sources_fixture());
        let mut files = FileMap::new();

        assembler.files_for("evm", &mut files).await.unwrap();

        assert!(files.contains("src/lib/contract-schema.ts"));
        assert!(files.contains("src/lib/utils.ts"));
        assert!(files.contains("src/adapters/evm/adapter.ts"));
        assert!(files.contains("src/adapters/evm/types.ts"));
        assert!(!files.paths().any(|p| p.contains("solana")));

        let index = files
            .get("src/adapters/index.ts")
            .and_then(|c| c.as_text())
            .unwrap();
        assert!(index.contains("from '@formpack/renderer'"));
        assert!(index.contains("import type { ContractSchema, FunctionParam }"));
        assert!(index.contains("import { EvmAdapter } from './evm/adapter';"));
        assert!(index.contains("export interface ContractAdapter {"));
        assert!(index.contains("signAndSend(tx: { payload: unknown }): Promise<string>;"));
        assert!(index.contains("export { EvmAdapter };"));
        assert!(!index.contains("SolanaAdapter"));
    }

    #[tokio::test]
    async fn test_files_for_is_idempotent() {
        let assembler = AdapterAssembler::new(sources_fixture());

        let mut first = FileMap::new();
        assembler.files_for("evm", &mut first).await.unwrap();
        let mut second = FileMap::new();
        assembler.files_for("evm", &mut second).await.unwrap();

        assert_eq!(first.fingerprint(), second.fingerprint());

        // Re-assembling into an already-populated map changes nothing
        assembler.files_for("evm", &mut first).await.unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_first_calls_share_registry_build() {
        let assembler = AdapterAssembler::new(sources_fixture());

        let mut left = FileMap::new();
        let mut right = FileMap::new();
        let (a, b) = tokio::join!(
            assembler.files_for("evm", &mut left),
            assembler.files_for("solana", &mut right),
        );

        a.unwrap();
        b.unwrap();
        assert!(left.contains("src/adapters/evm/adapter.ts"));
        assert!(right.contains("src/adapters/solana/adapter.ts"));
    }

    #[test]
    fn test_filter_index_pascal_cases_multi_segment_ids() {
        let index = "import { X } from '@formpack/renderer';\n\nexport interface ContractAdapter {\n}\n";
        let filtered = filter_index(index, "my-chain").unwrap();
        assert!(filtered.contains("import { MyChainAdapter } from './my-chain/adapter';"));
        assert!(filtered.contains("export { MyChainAdapter };"));
    }

    #[test]
    fn test_filter_index_keeps_renderer_subpath_imports() {
        let index = "import '@formpack/renderer/styles.css';\nimport { x } from '@formpack/renderer-extras';\n\nexport interface ContractAdapter {\n}\n";
        let filtered = filter_index(index, "evm").unwrap();
        assert!(filtered.contains("import '@formpack/renderer/styles.css';"));
        assert!(!filtered.contains("renderer-extras"));
    }

    #[test]
    fn test_filter_index_keeps_multiline_imports() {
        let index = "import {\n  FormRenderer,\n  registerAdapter,\n} from '@formpack/renderer';\n\nexport interface ContractAdapter {\n  readonly ecosystem: string;\n}\n";
        let filtered = filter_index(index, "evm").unwrap();
        assert!(filtered.contains("  registerAdapter,\n} from '@formpack/renderer';"));
    }

    #[test]
    fn test_interface_block_counts_nested_braces() {
        let block = interface_block(INDEX_FIXTURE).unwrap();
        assert!(block.starts_with("export interface ContractAdapter {"));
        assert!(block.ends_with('}'));
        assert!(block.contains("{ payload: unknown }"));
        assert!(!block.contains("export const adapters"));
    }

    #[test]
    fn test_missing_interface_is_a_parse_error() {
        let err = filter_index("import { A } from 'b';\n", "evm").unwrap_err();
        assert_eq!(err.code(), codes::EXPORT_INDEX_PARSE_FAILED);
    }

    #[test]
    fn test_unterminated_interface_is_a_parse_error() {
        let source = "export interface ContractAdapter {\n  readonly ecosystem: string;\n";
        let err = interface_block(source).unwrap_err();
        assert_eq!(err.code(), codes::EXPORT_INDEX_PARSE_FAILED);
        assert!(err.message().contains("unterminated"));
    }

    #[test]
    fn test_ecosystem_segment() {
        assert_eq!(ecosystem_segment("adapters/evm/adapter.ts"), Some("evm"));
        assert_eq!(ecosystem_segment("adapters/index.ts"), None);
        assert_eq!(ecosystem_segment("lib/utils.ts"), None);
    }
}
