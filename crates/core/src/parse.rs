//! Interface parsing: locate `DECLARE_INTERFACE` markers, delimit their
//! brace-balanced bodies, extract `STDMETHOD` declarations, and normalize
//! parameter text into forwardable argument names.

use crate::types::{InterfaceDefinition, InterfaceMethod, DEFAULT_RETURN_TYPE};
use regex::Regex;
use std::ops::Range;

// ---------------------------------------------------------------------------
// Declaration markers
// ---------------------------------------------------------------------------

/// The two-line idiom announcing an interface, with the `DECLARE_INTERFACE`
/// variant distinguishing "name + base" from "name only".
fn marker_regex() -> Regex {
    Regex::new(
        r"#undef\s+INTERFACE\s*\n\s*#define\s+INTERFACE\s+(\w+)\s*\n\s*DECLARE_INTERFACE(?:_\(\s*(\w+)\s*,\s*(\w+)\s*\)|\(\s*(\w+)\s*\))",
    )
    .unwrap()
}

/// One declaration marker together with its body span, when the body closed.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedInterface {
    pub name: String,
    /// Base interface name; empty for the name-only marker form.
    pub base: String,
    /// Byte range of the text between the opening brace and its matching
    /// closer (both excluded). `None` when depth never returned to zero.
    pub body: Option<Range<usize>>,
}

/// Find every declaration marker in `content` and delimit its body.
pub fn locate_interfaces(content: &str) -> Vec<LocatedInterface> {
    let re = marker_regex();
    let mut located = Vec::new();

    for caps in re.captures_iter(content) {
        let (name, base) = match caps.get(2) {
            // DECLARE_INTERFACE_(name, base)
            Some(name) => (name.as_str(), caps.get(3).map_or("", |m| m.as_str())),
            // DECLARE_INTERFACE(name)
            None => (caps.get(4).map_or("", |m| m.as_str()), ""),
        };

        let marker_end = caps.get(0).map_or(0, |m| m.end());
        located.push(LocatedInterface {
            name: name.to_string(),
            base: base.to_string(),
            body: find_body(content, marker_end),
        });
    }

    located
}

/// Interface names announced by markers, regardless of whether a body follows.
/// Used by the stub emitter, which only needs the names. Internal names with a
/// leading underscore are excluded.
pub fn scan_interface_names(content: &str) -> Vec<String> {
    let re = Regex::new(
        r"#undef\s+INTERFACE\s*\n\s*#define\s+INTERFACE\s+(\w+)\s*\n\s*DECLARE_INTERFACE",
    )
    .unwrap();
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|name| !name.starts_with('_'))
        .map(|name| name.to_string())
        .collect()
}

/// Scan forward from `start` tracking `{`/`}` depth. The first `{` opens the
/// body; the point where depth returns to zero closes it. Nested braces in
/// inline initializers or default-value expressions are counted uniformly.
fn find_body(content: &str, start: usize) -> Option<Range<usize>> {
    let mut depth: i32 = 0;
    let mut body_start: Option<usize> = None;

    for (i, ch) in content[start..].char_indices() {
        let pos = start + i;
        match ch {
            '{' => {
                if body_start.is_none() {
                    body_start = Some(pos + 1);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return body_start.map(|s| s..pos);
                }
            }
            _ => {}
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Method extraction
// ---------------------------------------------------------------------------

/// `STDMETHOD_(type, name)(params)` and `STDMETHOD(name)(params)` forms, with
/// an optional `SCONST`, an optional `OVERRIDE` (ignored), and the mandatory
/// `PURE;` terminator. Anything not matching end to end is not a method.
fn method_regex() -> Regex {
    Regex::new(
        r"(?s)STDMETHOD(?:_\(([^,]+),\s*(\w+)\)|\((\w+)\))\s*\(([^)]*)\)\s*(SCONST)?\s*(?:OVERRIDE\s*)?PURE;",
    )
    .unwrap()
}

/// Extract method declarations from an interface body, in declaration order.
pub fn extract_methods(body: &str) -> Vec<InterfaceMethod> {
    let re = method_regex();
    let mut methods = Vec::new();

    for caps in re.captures_iter(body) {
        let (return_type, name) = match caps.get(1) {
            Some(ty) => (
                ty.as_str().trim().to_string(),
                caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            ),
            None => (
                DEFAULT_RETURN_TYPE.to_string(),
                caps.get(3).map_or("", |m| m.as_str()).trim().to_string(),
            ),
        };

        let params_raw = clean_params(caps.get(4).map_or("", |m| m.as_str()));
        let is_const = caps.get(5).is_some();

        methods.push(InterfaceMethod { return_type, name, params_raw, is_const });
    }

    methods
}

/// Collapse whitespace runs, strip the `THIS_`/`THIS` receiver placeholders,
/// and drop the leading comma the placeholder removal leaves behind.
fn clean_params(raw: &str) -> String {
    let collapsed = Regex::new(r"\s+").unwrap().replace_all(raw.trim(), " ");
    let stripped = collapsed.replace("THIS_", "").replace("THIS", "");
    let stripped = stripped.trim();
    stripped.strip_prefix(',').map_or(stripped, str::trim_start).to_string()
}

/// Parse every interface in a file's text: markers, bodies, methods.
/// Interfaces whose body never closed are reported by name instead of dropped
/// silently.
pub fn parse_interfaces(content: &str) -> (Vec<InterfaceDefinition>, Vec<String>) {
    let mut interfaces = Vec::new();
    let mut unterminated = Vec::new();

    for loc in locate_interfaces(content) {
        match loc.body {
            Some(range) => {
                let mut def = InterfaceDefinition::new(loc.name, loc.base);
                def.methods = extract_methods(&content[range]);
                interfaces.push(def);
            }
            None => unterminated.push(loc.name),
        }
    }

    (interfaces, unterminated)
}

// ---------------------------------------------------------------------------
// Parameter normalization
// ---------------------------------------------------------------------------

/// Reduce raw parameter text to the bare argument names used both in macro
/// parameter lists and in forwarding calls: last whitespace token per comma
/// segment, default-value suffix stripped, leading `*`/`&` sigils stripped.
/// The receiver is never part of this list; emitters prepend it.
pub fn normalize_params(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }
            let last = segment.split_whitespace().last()?;
            let name = last.split('=').next().unwrap_or(last).trim();
            let name = name.trim_start_matches(['*', '&']);
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TIMER: &str = r#"
#undef INTERFACE
#define INTERFACE ITimer
DECLARE_INTERFACE_(ITimer, IUnknown)
{
    STDMETHOD_(long, AddRef)(THIS) PURE;
    STDMETHOD_(long, Release)(THIS) PURE;
    STDMETHOD_(void, OnFinalRelease)(THIS) PURE;
    STDMETHOD_(BOOL, StartTimer)(THIS_ int elapse, BOOL repeat, LPARAM data) PURE;
    STDMETHOD_(void, KillTimer)(THIS) PURE;
};
"#;

    #[test]
    fn test_marker_with_base() {
        let located = locate_interfaces(TIMER);
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].name, "ITimer");
        assert_eq!(located[0].base, "IUnknown");
        assert!(located[0].body.is_some());
    }

    #[test]
    fn test_marker_without_base() {
        let src = "#undef INTERFACE\n#define INTERFACE IObjRef\nDECLARE_INTERFACE(IObjRef)\n{\n};\n";
        let located = locate_interfaces(src);
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].name, "IObjRef");
        assert_eq!(located[0].base, "");
    }

    #[test]
    fn test_body_excludes_terminating_closer() {
        let located = locate_interfaces(TIMER);
        let body = located[0].body.clone().unwrap();
        let text = &TIMER[body];
        assert!(text.contains("KillTimer"));
        assert!(!text.contains('}'));
    }

    #[test]
    fn test_nested_braces_are_counted() {
        let src = "#undef INTERFACE\n#define INTERFACE INest\nDECLARE_INTERFACE_(INest, IUnknown)\n{\n    STDMETHOD_(void, Init)(THIS_ RECT rc = {0, 0, 1, 1}) PURE;\n};\nint after;\n";
        let located = locate_interfaces(src);
        let body = located[0].body.clone().unwrap();
        let text = &src[body];
        let opens = text.matches('{').count();
        let closes = text.matches('}').count();
        assert_eq!(opens, closes);
        assert!(text.contains("PURE;"));
        assert!(!src[located[0].body.clone().unwrap().end..].contains("PURE"));
    }

    #[test]
    fn test_unterminated_body_is_reported() {
        let src = "#undef INTERFACE\n#define INTERFACE IBroken\nDECLARE_INTERFACE_(IBroken, IUnknown)\n{\n    STDMETHOD_(void, Leak)(THIS) PURE;\n";
        let (interfaces, unterminated) = parse_interfaces(src);
        assert!(interfaces.is_empty());
        assert_eq!(unterminated, vec!["IBroken".to_string()]);
    }

    #[test]
    fn test_extract_methods_order_and_forms() {
        let (interfaces, _) = parse_interfaces(TIMER);
        let methods = &interfaces[0].methods;
        assert_eq!(methods.len(), 5);
        assert_eq!(methods[0].name, "AddRef");
        assert_eq!(methods[0].return_type, "long");
        assert_eq!(methods[0].params_raw, "");
        assert_eq!(methods[3].name, "StartTimer");
        assert_eq!(methods[3].params_raw, "int elapse, BOOL repeat, LPARAM data");
    }

    #[test]
    fn test_implicit_return_type_is_hresult() {
        let body = "STDMETHOD(QueryInterface)(THIS_ REFGUID id, IObjRef **ppRet) PURE;";
        let methods = extract_methods(body);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].return_type, "HRESULT");
        assert_eq!(methods[0].params_raw, "REFGUID id, IObjRef **ppRet");
    }

    #[test]
    fn test_const_and_override_tokens() {
        let body = "STDMETHOD_(int, GetCount)(THIS) SCONST PURE;\nSTDMETHOD_(void, Reset)(THIS) OVERRIDE PURE;";
        let methods = extract_methods(body);
        assert_eq!(methods.len(), 2);
        assert!(methods[0].is_const);
        assert!(!methods[1].is_const);
    }

    #[test]
    fn test_missing_pure_is_not_a_method() {
        let body = "STDMETHOD_(int, GetCount)(THIS);\nSTDMETHOD_(void, Run)(THIS) PURE;";
        let methods = extract_methods(body);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "Run");
    }

    #[test]
    fn test_params_whitespace_collapsed() {
        let body = "STDMETHOD_(void, Move)(THIS_  int   x,\n        int y) PURE;";
        let methods = extract_methods(body);
        assert_eq!(methods[0].params_raw, "int x, int y");
    }

    #[test]
    fn test_normalize_params_basic() {
        assert_eq!(normalize_params("int index"), vec!["index"]);
        assert_eq!(
            normalize_params("int elapse, BOOL repeat, LPARAM data"),
            vec!["elapse", "repeat", "data"]
        );
        assert!(normalize_params("").is_empty());
    }

    #[test]
    fn test_normalize_params_sigils_and_defaults() {
        assert_eq!(normalize_params("IWindow **ppWnd"), vec!["ppWnd"]);
        assert_eq!(normalize_params("const RECT &rc"), vec!["rc"]);
        assert_eq!(normalize_params("BOOL redraw=TRUE"), vec!["redraw"]);
    }

    #[test]
    fn test_scan_interface_names_skips_internal() {
        let src = "#undef INTERFACE\n#define INTERFACE _IPrivate\nDECLARE_INTERFACE_(_IPrivate, IUnknown)\n{\n};\n#undef INTERFACE\n#define INTERFACE ICaret\nDECLARE_INTERFACE_(ICaret, IObjRef)\n{\n};\n";
        assert_eq!(scan_interface_names(src), vec!["ICaret".to_string()]);
    }
}
