//! Stub rendering
//!
//! Rendering is split into typed contexts (built from the schema) and a
//! [`StubRenderer`] that turns a context into file text. Callers construct
//! the renderer and pass it down; [`PyiRenderer`] is the stock implementation.

use crate::naming::{self, normalize_field};
use crate::type_map::{map_type, py_str_literal};
use eplus_stubs_schema::SchemaObjectDef;
use std::fmt::Write;

/// Module that provides the `EpBunch` base class at type-check time.
pub const DEFAULT_EPBUNCH_MODULE: &str = "geomeppy.patches";

/// One attribute line of a class stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    pub name: String,
    pub annotation: String,
    pub note: Option<String>,
}

/// Everything needed to render one object class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContext {
    pub classname: String,
    pub docstring: Option<String>,
    pub fields: Vec<FieldContext>,
}

impl ObjectContext {
    pub fn from_def(obj: &SchemaObjectDef) -> Self {
        let fields = obj
            .fields
            .iter()
            .map(|field| FieldContext {
                name: normalize_field(&field.name),
                annotation: map_type(field).annotation(),
                note: non_blank(field.note.as_deref()).map(sanitize_doc),
            })
            .collect();

        Self {
            classname: naming::normalize(&obj.name),
            docstring: non_blank(obj.documentation.as_deref()).map(sanitize_doc),
            fields,
        }
    }
}

/// One `newidfobject` overload / `IDFObjectsDict` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOverload {
    pub classname: String,
    pub key: String,
}

/// Context for the aggregate `idf.pyi` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdfContext {
    pub eplus_version: String,
    pub version_classname: String,
    pub overloads: Vec<EntryOverload>,
}

impl IdfContext {
    pub fn new<'a>(eplus_version: &str, classnames: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            eplus_version: eplus_version.to_string(),
            version_classname: naming::version_classname(eplus_version),
            overloads: classnames
                .into_iter()
                .map(|c| EntryOverload {
                    classname: c.to_string(),
                    key: naming::lookup_key(c),
                })
                .collect(),
        }
    }
}

/// Context for package metadata files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageContext {
    /// Distribution name, e.g. `eppy-stubs`
    pub pypi_name: String,
    /// Import package directory under `src/`
    pub slug: String,
    /// Full package version, `<eplus_version>.<patch>`
    pub version: String,
    pub eplus_version: String,
    /// Library the stubs describe (`eppy`, `archetypal`)
    pub library_name: String,
}

/// Turns render contexts into file text.
pub trait StubRenderer {
    fn render_object(&self, ctx: &ObjectContext) -> String;
    fn render_idf(&self, ctx: &IdfContext) -> String;
    fn render_pyproject(&self, ctx: &PackageContext) -> String;
    fn render_readme(&self, ctx: &PackageContext) -> String;
}

/// Render one object definition with `renderer`.
pub fn render(renderer: &dyn StubRenderer, obj: &SchemaObjectDef) -> String {
    renderer.render_object(&ObjectContext::from_def(obj))
}

/// Escape text for use inside a `"""` docstring: backslashes and double
/// quotes are escaped so the text cannot close the docstring early.
pub fn sanitize_doc(text: &str) -> String {
    text.trim().replace('\\', "\\\\").replace('"', "\\\"")
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Renders `.pyi` stubs and hatchling package metadata.
#[derive(Debug, Clone)]
pub struct PyiRenderer {
    epbunch_module: String,
}

impl Default for PyiRenderer {
    fn default() -> Self {
        Self {
            epbunch_module: DEFAULT_EPBUNCH_MODULE.to_string(),
        }
    }
}

impl PyiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import `EpBunch` from a different module.
    pub fn with_epbunch_module(mut self, module: impl Into<String>) -> Self {
        self.epbunch_module = module.into();
        self
    }
}

// `write!` into a String cannot fail; results are ignored throughout.
impl StubRenderer for PyiRenderer {
    fn render_object(&self, ctx: &ObjectContext) -> String {
        let mut out = String::new();
        out.push_str("from typing import Annotated, Literal\n\n");
        let _ = writeln!(out, "from {} import EpBunch", self.epbunch_module);
        out.push_str("from pydantic import Field\n\n\n");

        let _ = writeln!(out, "class {}(EpBunch):", ctx.classname);
        if let Some(doc) = &ctx.docstring {
            let _ = writeln!(out, "    \"\"\"{}\"\"\"", doc);
            if !ctx.fields.is_empty() {
                out.push('\n');
            }
        }

        if ctx.fields.is_empty() {
            out.push_str("    pass\n");
            return out;
        }

        for field in &ctx.fields {
            let _ = writeln!(out, "    {}: {}", field.name, field.annotation);
            if let Some(note) = &field.note {
                let _ = writeln!(out, "    \"\"\"{}\"\"\"", note);
            }
        }
        out
    }

    fn render_idf(&self, ctx: &IdfContext) -> String {
        let mut out = String::new();
        out.push_str("from __future__ import annotations\n\n");
        out.push_str("from typing import Literal, TypedDict, overload\n\n");
        let _ = writeln!(out, "from {} import EpBunch", self.epbunch_module);
        out.push('\n');

        for o in &ctx.overloads {
            let _ = writeln!(out, "from .objects.{0} import {0}", o.classname);
        }
        if !ctx.overloads.is_empty() {
            out.push('\n');
        }

        out.push_str("IDFObjectsDict = TypedDict('IDFObjectsDict', {\n");
        for o in &ctx.overloads {
            let _ = writeln!(out, "    {}: list[{}],", py_str_literal(&o.key), o.classname);
        }
        out.push_str("})\n\n\n");

        let version = py_str_literal(&ctx.eplus_version);
        out.push_str("class IDF:\n");
        for kwarg in ["as_version", "file_version"] {
            out.push_str("    @overload\n");
            let _ = writeln!(
                out,
                "    def __init__(self: {}, *, {}: Literal[{}], **kwargs) -> None: ...",
                ctx.version_classname, kwarg, version
            );
        }
        out.push_str("    @overload\n");
        out.push_str("    def __init__(self, *args, **kwargs) -> None: ...\n");

        for o in &ctx.overloads {
            out.push_str("    @overload\n");
            let _ = writeln!(
                out,
                "    def newidfobject(self, key: Literal[{}], **kwargs) -> {}: ...",
                py_str_literal(&o.key),
                o.classname
            );
        }
        // A lone signature must not be marked as an overload
        if !ctx.overloads.is_empty() {
            out.push_str("    @overload\n");
        }
        out.push_str("    def newidfobject(self, key: str, **kwargs) -> EpBunch: ...\n");
        out.push_str("    @property\n");
        out.push_str("    def idfobjects(self) -> IDFObjectsDict: ...\n\n\n");

        let _ = writeln!(out, "class {}(IDF):", ctx.version_classname);
        out.push_str("    pass\n");
        out
    }

    fn render_pyproject(&self, ctx: &PackageContext) -> String {
        let mut out = String::new();
        out.push_str("[project]\n");
        let _ = writeln!(out, "name = \"{}\"", ctx.pypi_name);
        let _ = writeln!(out, "version = \"{}\"", ctx.version);
        let _ = writeln!(
            out,
            "description = \"EnergyPlus {} type stubs for {}\"",
            ctx.eplus_version, ctx.library_name
        );
        out.push_str("requires-python = \">=3.9,<4.0\"\n");
        out.push_str("dependencies = [\"pydantic>=2\"]\n");
        out.push_str("classifiers = [\n");
        out.push_str("    'Typing :: Stubs Only',\n");
        out.push_str("    'Programming Language :: Python :: 3',\n");
        out.push_str("]\n\n");
        out.push_str("[build-system]\n");
        out.push_str("requires = ['hatchling']\n");
        out.push_str("build-backend = 'hatchling.build'\n\n");
        out.push_str("[tool.hatch.build.targets.wheel]\n");
        let _ = writeln!(out, "packages = ['src/{}']", ctx.slug);
        out
    }

    fn render_readme(&self, ctx: &PackageContext) -> String {
        format!(
            "# {name}\n\n\
             Generated type stubs for the {library} view of the EnergyPlus {eplus} \
             object model.\n\n\
             Install next to `{library}` and let your type checker pick up `src/{slug}`:\n\n\
             ```sh\npip install {name}=={version}\n```\n",
            name = ctx.pypi_name,
            library = ctx.library_name,
            eplus = ctx.eplus_version,
            slug = ctx.slug,
            version = ctx.version,
        )
    }
}
