//! Aggregator maintenance: recompute the manifest header's include list from
//! the output directory's current contents and rewrite only the bounded
//! include section, leaving the surrounding boilerplate untouched.

use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Opening comment that starts the bounded include section. The historical
/// wording varied between "individual" and "generated"; both are accepted.
const SECTION_OPEN_RE: &str = r"/\* Include all (?:individual|generated) C API headers \*/";

/// Canonical opening comment written back on every update.
const SECTION_OPEN: &str = "/* Include all generated C API headers */";

/// Boilerplate written when the aggregator does not exist yet: guard,
/// C-linkage wrapper, the include-section opening comment, the status-check
/// macros, and the generic lifecycle helpers the stub headers delegate to.
const AGGREGATOR_TEMPLATE: &str = r#"#ifndef __SOUI_CAPI_H__
#define __SOUI_CAPI_H__

/*
 * SOUI C API Helper Macros
 *
 * This header provides C-style function call macros for all SOUI C++ interfaces.
 * Auto-generated by soui-capigen - DO NOT EDIT MANUALLY
 */

#ifdef __cplusplus
extern "C" {
#endif

/* Include all generated C API headers */

/* Common utility macros and functions */
#define SOUI_SUCCEEDED(hr) ((HRESULT)(hr) >= 0)
#define SOUI_FAILED(hr) ((HRESULT)(hr) < 0)

static inline long SOUI_SafeAddRef(IUnknown* pObj)
{
    return pObj ? pObj->lpVtbl->AddRef(pObj) : 0;
}

static inline long SOUI_SafeRelease(IUnknown** ppObj)
{
    long ref = 0;
    if (ppObj && *ppObj) {
        ref = (*ppObj)->lpVtbl->Release(*ppObj);
        *ppObj = NULL;
    }
    return ref;
}

#ifdef __cplusplus
}
#endif

#endif /* __SOUI_CAPI_H__ */
"#;

/// Outcome of one aggregator update.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatorStatus {
    /// The include section was rewritten with this many directives.
    Updated { includes: usize },
    /// The bounded include section was not found; the file is untouched.
    SectionNotFound,
}

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

/// Sorted `*-capi.h` file names in `output_dir`, excluding the aggregator's
/// own file. Recomputed from the directory rather than carried in memory, so
/// the update is independent of what the current run happened to write.
pub fn list_generated_headers(output_dir: &Path, aggregator_name: &str) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with("-capi.h") && name != aggregator_name)
        .collect();
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Include-section rewrite
// ---------------------------------------------------------------------------

/// Rewrite the bounded include section of `content` with one directive per
/// header name. Returns `None` when the opening comment is absent.
pub fn rewrite_include_section(content: &str, headers: &[String]) -> Option<String> {
    let open = Regex::new(SECTION_OPEN_RE).unwrap();
    let marker = open.find(content)?;

    // The section runs from the opening comment to the next comment or the
    // end of the following blank line, whichever comes first.
    let rest = &content[marker.end()..];
    let pos_comment = rest.find("/*");
    let pos_blank = rest.find("\n\n").map(|p| p + 2);
    let section_end = marker.end()
        + match (pos_comment, pos_blank) {
            (Some(c), Some(b)) => c.min(b),
            (Some(c), None) => c,
            (None, Some(b)) => b,
            (None, None) => rest.len(),
        };

    let mut section = String::from(SECTION_OPEN);
    section.push('\n');
    for name in headers {
        section.push_str(&format!("#include \"{name}\"\n"));
    }
    section.push('\n');

    let mut out = String::with_capacity(content.len() + section.len());
    out.push_str(&content[..marker.start()]);
    out.push_str(&section);
    out.push_str(&content[section_end..]);
    Some(out)
}

/// Bring the aggregator in `output_dir` up to date with the directory's
/// current `*-capi.h` contents, creating it from the fixed template first if
/// it does not exist.
pub fn update_aggregator(output_dir: &Path, aggregator_name: &str) -> io::Result<AggregatorStatus> {
    let path = output_dir.join(aggregator_name);
    if !path.exists() {
        fs::write(&path, AGGREGATOR_TEMPLATE)?;
        debug!(file = aggregator_name, "Created aggregator from template");
    }

    let headers = list_generated_headers(output_dir, aggregator_name)?;
    let content = fs::read_to_string(&path)?;

    match rewrite_include_section(&content, &headers) {
        Some(updated) => {
            // Avoid touching the file's mtime when nothing changed.
            if updated != content {
                fs::write(&path, updated)?;
            }
            Ok(AggregatorStatus::Updated { includes: headers.len() })
        }
        None => Ok(AggregatorStatus::SectionNotFound),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
