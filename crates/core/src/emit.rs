//! Header emission: one [`HeaderSpec`] abstraction with two construction
//! paths (full method list, lifecycle-only stub) and a single render routine,
//! so the macro and inline-function templates cannot diverge between modes.

use crate::parse::normalize_params;
use crate::types::{InterfaceDefinition, InterfaceMethod};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Header specification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderKind {
    /// Every extracted method of a single interface.
    Full,
    /// Lifecycle-only entries for every interface declared in one file.
    Stub,
}

/// Everything needed to render one `*-capi.h` header.
#[derive(Debug, Clone)]
pub struct HeaderSpec {
    /// Output stem: file `<stem>-capi.h`, guard `__<STEM>_CAPI_H__`.
    pub stem: String,
    /// Originating header, included relative to the output directory.
    pub source_file: String,
    pub kind: HeaderKind,
    /// Interfaces with the methods emitted for them, in order.
    pub interfaces: Vec<(String, Vec<InterfaceMethod>)>,
}

/// The three operations every SOUI interface inherits.
fn lifecycle_methods() -> Vec<InterfaceMethod> {
    let entry = |return_type: &str, name: &str| InterfaceMethod {
        return_type: return_type.to_string(),
        name: name.to_string(),
        params_raw: String::new(),
        is_const: false,
    };
    vec![
        entry("long", "AddRef"),
        entry("long", "Release"),
        entry("void", "OnFinalRelease"),
    ]
}

impl HeaderSpec {
    /// Full-mode spec for one interface with extracted methods.
    pub fn full(def: &InterfaceDefinition, source_file: &str) -> Self {
        Self {
            stem: def.name.clone(),
            source_file: source_file.to_string(),
            kind: HeaderKind::Full,
            interfaces: vec![(def.name.clone(), def.methods.clone())],
        }
    }

    /// Stub-mode spec for every interface declared in `source_file`. The stem
    /// comes from the file name, since one file may declare several
    /// interfaces.
    pub fn stub(source_file: &str, interface_names: &[String]) -> Self {
        let stem = source_file
            .strip_suffix("-i.h")
            .or_else(|| source_file.strip_suffix(".h"))
            .unwrap_or(source_file);
        Self {
            stem: stem.to_string(),
            source_file: source_file.to_string(),
            kind: HeaderKind::Stub,
            interfaces: interface_names
                .iter()
                .map(|name| (name.clone(), lifecycle_methods()))
                .collect(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}-capi.h", self.stem)
    }

    fn guard(&self) -> String {
        format!("__{}_CAPI_H__", self.stem.to_uppercase())
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Render the complete header text.
    pub fn render(&self) -> String {
        let guard = self.guard();
        let subject = match self.kind {
            HeaderKind::Full => "Interface",
            HeaderKind::Stub => "Interfaces",
        };

        let mut out = format!(
            "#ifndef {guard}\n#define {guard}\n\n#include \"../{}\"\n\n#ifdef __cplusplus\nextern \"C\" {{\n#endif\n\n",
            self.source_file
        );

        out.push_str(&format!(
            "/*\n * C API Helper Macros for {} {subject}\n * These macros provide C-style function call syntax for C++ interface methods\n",
            self.stem
        ));
        if self.kind == HeaderKind::Stub {
            out.push_str(
                " *\n * Note: This is a basic template. You may need to add specific methods\n * based on the actual interface definitions.\n",
            );
        }
        out.push_str(" */\n\n");

        // Macro section
        for (interface, methods) in &self.interfaces {
            if self.kind == HeaderKind::Stub {
                out.push_str(&format!("/* {interface} C API Macros */\n"));
            }
            for method in methods {
                out.push_str(&render_macro(interface, method));
            }
            if self.kind == HeaderKind::Stub {
                out.push_str(&format!("/* Add more {interface} methods here as needed */\n\n"));
            }
        }

        // Inline wrapper section
        out.push_str(
            "/*\n * C API Helper Functions (Optional - for more C-like usage)\n * These functions provide an alternative C-style API\n */\n\n",
        );
        for (interface, methods) in &self.interfaces {
            if self.kind == HeaderKind::Stub {
                out.push_str(&format!("/* {interface} Helper Functions */\n"));
            }
            for method in methods {
                out.push_str(&render_inline_fn(interface, method));
            }
        }

        // Safe-variant convenience macros, stub mode only: delegate to the
        // generic base-interface helpers defined in the aggregator.
        if self.kind == HeaderKind::Stub {
            out.push_str("/*\n * Convenience macros for common operations\n */\n\n");
            for (interface, _) in &self.interfaces {
                out.push_str(&format!(
                    "#define {interface}_SafeAddRef(This) \\\n    SOUI_SafeAddRef((IUnknown*)(This))\n\n"
                ));
                out.push_str(&format!(
                    "#define {interface}_SafeRelease(This) \\\n    SOUI_SafeRelease((IUnknown**)(This))\n\n"
                ));
            }
        }

        out.push_str(&format!("#ifdef __cplusplus\n}}\n#endif\n\n#endif /* {guard} */\n"));
        out
    }

    /// Write the rendered header into `output_dir`, overwriting.
    pub fn write_to(&self, output_dir: &Path) -> io::Result<PathBuf> {
        let path = output_dir.join(self.file_name());
        fs::write(&path, self.render())?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Per-method templates
// ---------------------------------------------------------------------------

/// `This` followed by the normalized argument names, comma separated.
fn call_list(method: &InterfaceMethod) -> String {
    let mut list = String::from("This");
    for arg in normalize_params(&method.params_raw) {
        list.push_str(", ");
        list.push_str(&arg);
    }
    list
}

/// Function-call-style macro dispatching through the receiver's vtable.
fn render_macro(interface: &str, method: &InterfaceMethod) -> String {
    let list = call_list(method);
    format!(
        "#define {interface}_{name}({list}) \\\n    ((This)->lpVtbl->{name}({list}))\n\n",
        name = method.name
    )
}

/// Inline wrapper typed with the receiver first, forwarding through the macro.
fn render_inline_fn(interface: &str, method: &InterfaceMethod) -> String {
    let mut params = format!("{interface}* pThis");
    if !method.params_raw.is_empty() {
        params.push_str(", ");
        params.push_str(&method.params_raw);
    }

    let mut call = format!("{interface}_{}(pThis", method.name);
    for arg in normalize_params(&method.params_raw) {
        call.push_str(", ");
        call.push_str(&arg);
    }
    call.push(')');

    let statement = if method.return_type.trim() == "void" {
        format!("    {call};")
    } else {
        format!("    return {call};")
    };

    format!(
        "static inline {ret} {interface}_{name}_C({params})\n{{\n{statement}\n}}\n\n",
        ret = method.return_type,
        name = method.name
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InterfaceDefinition;

    fn method(ret: &str, name: &str, params: &str) -> InterfaceMethod {
        InterfaceMethod {
            return_type: ret.to_string(),
            name: name.to_string(),
            params_raw: params.to_string(),
            is_const: false,
        }
    }

    #[test]
    fn test_macro_prepends_receiver() {
        let m = method("int", "GetValue", "int index");
        assert_eq!(
            render_macro("IFoo", &m),
            "#define IFoo_GetValue(This, index) \\\n    ((This)->lpVtbl->GetValue(This, index))\n\n"
        );
    }

    #[test]
    fn test_macro_without_params() {
        let m = method("void", "KillTimer", "");
        assert_eq!(
            render_macro("ITimer", &m),
            "#define ITimer_KillTimer(This) \\\n    ((This)->lpVtbl->KillTimer(This))\n\n"
        );
    }

    #[test]
    fn test_inline_fn_returns_macro_result() {
        let m = method("int", "GetValue", "int index");
        assert_eq!(
            render_inline_fn("IFoo", &m),
            "static inline int IFoo_GetValue_C(IFoo* pThis, int index)\n{\n    return IFoo_GetValue(pThis, index);\n}\n\n"
        );
    }

    #[test]
    fn test_inline_fn_void_has_no_return() {
        let m = method("void", "KillTimer", "");
        let text = render_inline_fn("ITimer", &m);
        assert!(text.contains("    ITimer_KillTimer(pThis);"));
        assert!(!text.contains("return"));
    }

    #[test]
    fn test_full_header_structure() {
        let mut def = InterfaceDefinition::new("IFoo", "IUnknown");
        def.methods.push(method("int", "GetValue", "int index"));
        let spec = HeaderSpec::full(&def, "SFoo-i.h");

        assert_eq!(spec.file_name(), "IFoo-capi.h");
        let text = spec.render();
        assert!(text.starts_with("#ifndef __IFOO_CAPI_H__\n#define __IFOO_CAPI_H__\n"));
        assert!(text.contains("#include \"../SFoo-i.h\""));
        assert!(text.contains("extern \"C\" {"));
        assert!(text.contains("#define IFoo_GetValue(This, index)"));
        assert!(text.contains("static inline int IFoo_GetValue_C(IFoo* pThis, int index)"));
        assert!(text.ends_with("#endif /* __IFOO_CAPI_H__ */\n"));
        // Full mode carries no stub-only sections
        assert!(!text.contains("SafeAddRef"));
        assert!(!text.contains("basic template"));
    }

    #[test]
    fn test_stub_header_structure() {
        let names = vec!["ICaret".to_string(), "ICaretHost".to_string()];
        let spec = HeaderSpec::stub("scaret-i.h", &names);

        assert_eq!(spec.stem, "scaret");
        assert_eq!(spec.file_name(), "scaret-capi.h");
        let text = spec.render();
        assert!(text.contains("#ifndef __SCARET_CAPI_H__"));
        for name in ["ICaret", "ICaretHost"] {
            assert!(text.contains(&format!("#define {name}_AddRef(This)")));
            assert!(text.contains(&format!("#define {name}_Release(This)")));
            assert!(text.contains(&format!("#define {name}_OnFinalRelease(This)")));
            assert!(text.contains(&format!("static inline long {name}_AddRef_C({name}* pThis)")));
            assert!(text.contains(&format!("static inline void {name}_OnFinalRelease_C({name}* pThis)")));
            assert!(text.contains(&format!(
                "#define {name}_SafeAddRef(This) \\\n    SOUI_SafeAddRef((IUnknown*)(This))"
            )));
            assert!(text.contains(&format!(
                "#define {name}_SafeRelease(This) \\\n    SOUI_SafeRelease((IUnknown**)(This))"
            )));
        }
    }

    #[test]
    fn test_write_to_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut def = InterfaceDefinition::new("IFoo", "IUnknown");
        def.methods.push(method("int", "GetValue", "int index"));
        let spec = HeaderSpec::full(&def, "SFoo-i.h");

        std::fs::write(dir.path().join("IFoo-capi.h"), "stale").unwrap();
        let path = spec.write_to(dir.path()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("IFoo_GetValue"));
        assert!(!text.contains("stale"));
    }
}
