//! Built-in director setups
//!
//! Each setup is registered at compile time in [`BUILTIN_DIRECTORS`] and
//! selected by name from a package manifest. A setup runs before the
//! manifest's own policy ops, so a manifest can refine it.

use crate::director::policy::SpecBuilder;
use crate::director::spec::{CodeSection, GcType, GenKind};
use crate::typemap::{Direction, MapCode, Typemap};

/// A named policy setup
pub struct BuiltinDirector {
    /// Name used in manifests
    pub name: &'static str,
    /// Applies the setup's ops
    pub setup: fn(&mut SpecBuilder),
}

impl std::fmt::Debug for BuiltinDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinDirector").field("name", &self.name).finish()
    }
}

/// Distributed slice collecting the built-in setups at compile time
#[linkme::distributed_slice]
pub static BUILTIN_DIRECTORS: [BuiltinDirector];

/// Find a built-in setup by name
pub fn find_builtin(name: &str) -> Option<&'static BuiltinDirector> {
    BUILTIN_DIRECTORS.iter().find(|d| d.name == name)
}

/// Names of every built-in setup, sorted
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTIN_DIRECTORS.iter().map(|d| d.name).collect();
    names.sort_unstable();
    names
}

const NONE: &[&str] = &[];

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static CLIPBOARD: BuiltinDirector = BuiltinDirector {
    name: "clipboard",
    setup: clipboard,
};

fn clipboard(spec: &mut SpecBuilder) {
    spec.gc(GcType::Never, NONE)
        // a single global clipboard, never subclassed
        .disable_proxies()
        .swig_include("../shared/data_format.i")
        .swig_include("../shared/data_object_common.i")
        .make_abstract("wxClipboard")
        // data handed to the clipboard is owned by it
        .disown("wxDataObject* data")
        .add_extend_code(
            "wxClipboard",
            "static VALUE get_global_clipboard()\n{\n  return SWIG_NewPointerObj(wxTheClipboard, SWIGTYPE_p_wxClipboard, 0);\n}\n",
        );
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static COMBOBOX: BuiltinDirector = BuiltinDirector {
    name: "combobox",
    setup: combobox,
};

fn combobox(spec: &mut SpecBuilder) {
    spec.add_items(&["wxTextEntry"])
        .fold_bases("wxComboBox", &["wxTextEntry"])
        .override_inheritance_chain(
            "wxComboBox",
            &["wxControlWithItems", "wxControl", "wxWindow", "wxEvtHandler", "wxObject"],
        )
        .ignore(&["wxTextEntry::Clear", "wxTextEntry::IsEmpty", "wxComboBox::IsEmpty"])
        .rename_for_ruby("SetTextSelectionRange", &["wxComboBox::SetSelection(long, long)"])
        .rename_for_ruby(
            "GetTextSelectionRange",
            &["wxComboBox::GetSelection(long *, long *) const"],
        )
        .map_apply("long * OUTPUT", &["long *from", "long *to"]);
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static DATA_FORMAT: BuiltinDirector = BuiltinDirector {
    name: "data_format",
    setup: data_format,
};

const DATA_FORMAT_IDS: &[&str] = &[
    "INVALID",
    "TEXT",
    "BITMAP",
    "METAFILE",
    "SYLK",
    "DIF",
    "TIFF",
    "OEMTEXT",
    "DIB",
    "PALETTE",
    "PENDATA",
    "RIFF",
    "WAVE",
    "UNICODETEXT",
    "ENHMETAFILE",
    "FILENAME",
    "LOCALE",
    "PRIVATE",
    "HTML",
    "MAX",
];

fn data_format(spec: &mut SpecBuilder) {
    let constants: Vec<String> = DATA_FORMAT_IDS
        .iter()
        .map(|id| format!("%constant const int DATA_FORMAT_ID_{id} = wxDF_{id};"))
        .collect();
    spec.gc(GcType::Object, NONE)
        .ignore(&["wxDataFormat::operator ==(wxDataFormatId)"])
        // standard formats are exposed as DataFormat objects, ids as plain integers
        .map(
            Typemap::new(&["wxDataFormatId"])
                .rb_type("Wx::DataFormat")
                .with(
                    Direction::In,
                    MapCode::new("$1 = static_cast<wxDataFormatId>(NUM2INT($input));"),
                )
                .typecheck_with("INT32", "$1 = ( TYPE($input) == T_FIXNUM );")
                .with(Direction::Out, MapCode::new("$result = INT2NUM($1);")),
        )
        .code(CodeSection::Swig, &constants.join("\n"))
        .do_not_generate(&[GenKind::Variables]);
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static DEFS: BuiltinDirector = BuiltinDirector {
    name: "defs",
    setup: defs,
};

const DEFS_SWIG_CODE: &str = "%constant const int wxWXWIDGETS_MAJOR_VERSION = wxMAJOR_VERSION;
%constant const int wxWXWIDGETS_MINOR_VERSION = wxMINOR_VERSION;
%constant const int wxWXWIDGETS_RELEASE_NUMBER = wxRELEASE_NUMBER;
%constant const int wxWXWIDGETS_SUBRELEASE_NUMBER = wxSUBRELEASE_NUMBER;

#ifdef __WXDEBUG__
%constant const bool wxDEBUG = true;
#else
%constant const bool wxDEBUG = false;
#endif";

fn defs(spec: &mut SpecBuilder) {
    spec.set_items(&["defs"])
        .ignore(&[
            "wxINT8_MIN",
            "wxINT8_MAX",
            "wxUINT8_MAX",
            "wxINT16_MIN",
            "wxINT16_MAX",
            "wxUINT16_MAX",
            "wxINT32_MIN",
            "wxINT32_MAX",
            "wxUINT32_MAX",
            "wxINT64_MIN",
            "wxINT64_MAX",
            "wxUINT64_MAX",
            "wxVaCopy",
            "wxDataFormatId",
        ])
        .code(CodeSection::Swig, DEFS_SWIG_CODE);
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static GRID_SIZE_EVENT: BuiltinDirector = BuiltinDirector {
    name: "grid_size_event",
    setup: grid_size_event,
};

fn grid_size_event(spec: &mut SpecBuilder) {
    // dropped to suppress the import, re-established below
    spec.ignore_bases("wxGridSizeEvent", &["wxNotifyEvent"])
        .swig_import("swig/classes/include/wxObject.h")
        .swig_import("swig/classes/include/wxEvent.h")
        .override_base("wxGridSizeEvent", "wxNotifyEvent");
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static IMAGE: BuiltinDirector = BuiltinDirector {
    name: "image",
    setup: image,
};

const IMAGE_SWIG_CODE: &str = "%typemap(in) unsigned char* data, unsigned char* alpha {
  if ( TYPE($input) == T_STRING )
    {
      int data_len = RSTRING_LEN($input);
      $1 = (unsigned char*)malloc(data_len);
      memcpy($1, StringValuePtr($input), data_len);
    }
  else if ( $input == Qnil )
    $1 = NULL;
  else
    SWIG_exception_fail(SWIG_ERROR,
                        \"String required as raw Image data argument\");
}

%typemap(in, numinputs=0) bool static_data \"$1 = false;\"

%apply unsigned char *OUTPUT { unsigned char* r,
                               unsigned char* g,
                               unsigned char* b }";

const IMAGE_EXTEND_CODE: &str = "VALUE get_alpha_data() {
  unsigned char* alpha_data = $self->GetAlpha();
  int length = $self->GetWidth() * $self->GetHeight();
  return rb_str_new( (const char*)alpha_data, length);
}

VALUE get_rgb_data() {
  unsigned char* rgb_data = $self->GetData();
  int length = $self->GetWidth() * $self->GetHeight() * 3;
  return rb_str_new( (const char*)rgb_data, length);
}
";

fn image(spec: &mut SpecBuilder) {
    spec.swig_include("swig/shared/streams.i")
        .ignore(&[
            "wxImage::wxImage(wxInputStream &,wxBitmapType,int)",
            "wxImage::wxImage(wxInputStream &,const wxString &,int)",
            "wxImage::GetImageCount(wxInputStream &,wxBitmapType)",
        ])
        .rename(
            "LoadStream",
            &[
                "wxImage::LoadFile(wxInputStream &,long,int)",
                "wxImage::LoadFile(wxInputStream &,const wxString &,int)",
            ],
        )
        .rename(
            "Write",
            &[
                "wxImage::SaveFile(wxOutputStream &,int) const",
                "wxImage::SaveFile(wxOutputStream &,const wxString &) const",
            ],
        )
        .rename("SetAlphaData", &["wxImage::SetAlpha(unsigned char *,bool)"])
        .rename("SetRgbData", &["wxImage::SetData(unsigned char *)"])
        // image handlers cannot be written in Ruby
        .ignore(&[
            "wxImage::AddHandler",
            "wxImage::CleanUpHandlers",
            "wxImage::FindHandler",
            "wxImage::FindHandlerMime",
            "wxImage::GetHandlers",
            "wxImage::InitStandardHandlers",
            "wxImage::InsertHandler",
            "wxImage::RemoveHandler",
        ])
        .ignore(&["wxImage::GetData", "wxImage::GetAlpha"])
        .code(CodeSection::Swig, IMAGE_SWIG_CODE)
        .add_extend_code("wxImage", IMAGE_EXTEND_CODE)
        .do_not_generate(&[GenKind::Functions]);
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static SASH_LAYOUT_EVENT: BuiltinDirector = BuiltinDirector {
    name: "sash_layout_event",
    setup: sash_layout_event,
};

fn sash_layout_event(spec: &mut SpecBuilder) {
    spec.do_not_generate(&[
        GenKind::Variables,
        GenKind::Enums,
        GenKind::Defines,
        GenKind::Functions,
    ]);
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static TASK_BAR_ICON: BuiltinDirector = BuiltinDirector {
    name: "task_bar_icon",
    setup: task_bar_icon,
};

const POPUP_MENU_DIRECTOROUT: &str = "%typemap(directorout) wxMenu * {
  rb_iv_set(swig_get_self(), \"@__popmenu__\", $1);
  if (NIL_P($1))
  {
    $result = NULL;
  }
  else
  {
    void * ptr;
    bool swig_res = SWIG_ConvertPtr($1, &ptr, $1_descriptor, 0 | SWIG_POINTER_DISOWN);
    if (!SWIG_IsOK(swig_res))
    {
      rb_raise(rb_eTypeError,
               \"create_popup_menu must return a Wx::Menu, or nil\");
    }
    $result = reinterpret_cast < wxMenu * > (ptr);
  }
}";

fn task_bar_icon(spec: &mut SpecBuilder) {
    spec.gc(GcType::Never, NONE)
        // keeps the popup menu returned from Ruby marked
        .code(CodeSection::Swig, POPUP_MENU_DIRECTOROUT)
        .add_extend_code(
            "wxTaskBarIcon",
            "VALUE destroy()\n{\n  delete $self;\n  return Qnil;\n}\n",
        )
        // generated with the task bar icon event module
        .do_not_generate(&[
            GenKind::Variables,
            GenKind::Enums,
            GenKind::Defines,
            GenKind::Functions,
        ]);
}

#[linkme::distributed_slice(BUILTIN_DIRECTORS)]
static TOP_LEVEL_WINDOW: BuiltinDirector = BuiltinDirector {
    name: "top_level_window",
    setup: top_level_window,
};

fn top_level_window(spec: &mut SpecBuilder) {
    let begin = format!(
        "SWIG_WXTOPLEVELWINDOW_NO_USELESS_VIRTUALS({});",
        spec.module_name()
    );
    spec.code(CodeSection::SwigBegin, &begin).no_proxy(&[
        "wxTopLevelWindow::IsFullScreen",
        "wxWindow::GetDropTarget",
        "wxWindow::GetValidator",
    ]);
    if spec.module_name() != "wxTopLevelWindow" {
        return;
    }
    spec.code(
        CodeSection::Wrapper,
        "extern VALUE wxRuby_GetTopLevelWindowClass() {\n  return SwigClassWxTopLevelWindow.klass;\n}",
    )
    .ignore(&["wxTopLevelWindow::SaveGeometry", "wxTopLevelWindow::RestoreToGeometry"])
    .only_for(
        "wxuniversal",
        &[
            "wxTopLevelWindow::IsUsingNativeDecorations",
            "wxTopLevelWindow::UseNativeDecorations",
            "wxTopLevelWindow::UseNativeDecorationsByDefault",
        ],
    )
    .only_for("wxmsw", &["wxTopLevelWindow::MSWGetSystemMenu"])
    .swig_import("include/defs.h");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::PlatformGuard;

    fn build(director: &str, module: &str) -> crate::director::Spec {
        let mut builder = SpecBuilder::new(module, "Wx");
        (find_builtin(director).unwrap().setup)(&mut builder);
        builder.build()
    }

    #[test]
    fn test_builtin_inventory() {
        assert_eq!(
            builtin_names(),
            vec![
                "clipboard",
                "combobox",
                "data_format",
                "defs",
                "grid_size_event",
                "image",
                "sash_layout_event",
                "task_bar_icon",
                "top_level_window",
            ]
        );
        assert!(find_builtin("frame").is_none());
    }

    #[test]
    fn test_clipboard_setup() {
        let spec = build("clipboard", "wxClipboard");
        assert!(spec.disabled_proxies);
        assert_eq!(spec.gc_default, Some(GcType::Never));
        assert!(spec.abstracts.contains("wxClipboard"));
        assert_eq!(spec.disowns, vec![("wxDataObject* data".to_string(), true)]);
        assert_eq!(spec.swig_includes.len(), 2);
    }

    #[test]
    fn test_top_level_window_only_for_own_module() {
        let spec = build("top_level_window", "wxTopLevelWindow");
        assert_eq!(spec.only_for.len(), 2);
        assert_eq!(spec.only_for[1].0, PlatformGuard::Single("wxmsw".into()));
        assert!(spec.code(CodeSection::SwigBegin).contains("(wxTopLevelWindow);"));

        let spec = build("top_level_window", "wxFrame");
        assert!(spec.only_for.is_empty());
        assert_eq!(spec.no_proxies.len(), 3);
        assert!(spec.code(CodeSection::Wrapper).is_empty());
    }

    #[test]
    fn test_data_format_typemap_is_valid() {
        let spec = build("data_format", "wxDataFormat");
        assert_eq!(spec.typemaps.len(), 1);
        spec.typemaps[0].validate().unwrap();
        assert!(spec
            .code(CodeSection::Swig)
            .contains("%constant const int DATA_FORMAT_ID_HTML = wxDF_HTML;"));
        assert!(!spec.generates(GenKind::Variables));
    }
}
