//! Common typemap rules shared by every module

use super::{Direction, MapApply, MapCode, Typemap};

const OUTPUT_INT_DIRECTORARGOUT: &str = "if(output != Qnil)
{
  *$1 = (int)NUM2INT(output);
}
else
{
  *$1 = 0;
}";

const SIZE_POINT_IN: &str = "if ( TYPE($input) == T_DATA )
{
  void* argp$argnum;
  SWIG_ConvertPtr($input, &argp$argnum, $1_descriptor, 1 );
  $1 = reinterpret_cast< $1_basetype * >(argp$argnum);
}
else if ( TYPE($input) == T_ARRAY )
{
  $1 = new $1_basetype( NUM2INT( rb_ary_entry($input, 0) ),
                       NUM2INT( rb_ary_entry($input, 1) ) );
  SWIG_NewPointerObj($1, $1_descriptor, 1);
}
else
{
  rb_raise(rb_eTypeError, \"Wrong type for $1_basetype parameter\");
}";

const SIZE_POINT_TYPECHECK: &str = "void *vptr = 0;
$1 = 0;
if (TYPE($input) == T_ARRAY && RARRAY_LEN($input) == 2)
  $1 = 1;
else if (TYPE($input) == T_DATA && SWIG_CheckState (SWIG_ConvertPtr ($input, &vptr, $1_descriptor, 0)))
  $1 = 1;";

const STRING_ARRAY_IN: &str = "if (($input == Qnil) || (TYPE($input) != T_ARRAY))
{
  $1 = 0;
  $2 = NULL;
}
else
{
  arr = new wxString[ RARRAY_LEN($input) ];
  for (int i = 0; i < RARRAY_LEN($input); i++)
  {
    VALUE str = rb_ary_entry($input,i);
    arr[i] = wxString(StringValuePtr(str), wxConvUTF8);
  }
  $1 = RARRAY_LEN($input);
  $2 = arr;
}";

const ARRAY_STRING_IN: &str = "if (($input != Qnil) && (TYPE($input) == T_ARRAY))
{
  for (int i = 0; i < RARRAY_LEN($input); i++)
  {
    VALUE str = rb_ary_entry($input, i);
    tmp.Add(wxString(StringValuePtr(str), wxConvUTF8));
  }
}
$1 = &tmp;";

const ARRAY_STRING_OUT: &str = "$result = rb_ary_new();
for (size_t i = 0; i < $1.GetCount(); i++)
{
  rb_ary_push($result, WXSTR_TO_RSTR($1.Item(i)));
}";

const ARRAY_INT_IN: &str = "if (($input != Qnil) && (TYPE($input) == T_ARRAY))
{
  for (int i = 0; i < RARRAY_LEN($input); i++)
  {
    tmp.Add(NUM2INT(rb_ary_entry($input, i)));
  }
}
$1 = &tmp;";

const ARRAY_INT_OUT: &str = "$result = rb_ary_new();
for (size_t i = 0; i < $1.GetCount(); i++)
{
  rb_ary_push($result, INT2NUM($1.Item(i)));
}";

const WINDOW_PARENT_CHECK: &str = "if (!rb_const_defined(wxRuby_Core(), rb_intern(\"THE_APP\")))
{
  rb_raise(rb_eRuntimeError,
           \"Cannot create a Window before the App has started\");
}";

const EVENT_DIRECTORIN: &str = "#ifdef __WXRB_DEBUG__
$input = wxRuby_WrapWxEventInRuby(this, static_cast<wxEvent*> (&$1));
#else
$input = wxRuby_WrapWxEventInRuby(static_cast<wxEvent*> (&$1));
#endif";

fn output_int(pattern: &str) -> Typemap {
    Typemap::new(&[pattern])
        .rb_type("Integer")
        .with(Direction::DirectorArgout, MapCode::new(OUTPUT_INT_DIRECTORARGOUT))
}

fn string_typecheck(map: Typemap) -> Typemap {
    map.typecheck_with("STRING", "$1 = (TYPE($input) == T_STRING);")
}

fn enum_as_integer(name: &str) -> Typemap {
    Typemap::new(&[name])
        .rb_type("Integer")
        .with(Direction::In, MapCode::new("$1 = ($1_type)NUM2INT($input);"))
        .with(Direction::Out, MapCode::new("$result = INT2NUM((int)$1);"))
        .typecheck_with("INT32", "$1 = TYPE($input) == T_FIXNUM;")
}

/// The shared rule set, in lookup order
pub fn common_typemaps() -> Vec<Typemap> {
    let mut maps = vec![
        output_int("int * OUTPUT"),
        output_int("long * OUTPUT"),
        string_typecheck(
            Typemap::new(&["wxString&"])
                .rb_type("String")
                .with(
                    Direction::In,
                    MapCode::new("tmp = RSTR_TO_WXSTR($input); $1 = &tmp;").temp("wxString tmp"),
                )
                .with(Direction::Out, MapCode::new("$result = WXSTR_PTR_TO_RSTR($1);"))
                .with(Direction::DirectorOut, MapCode::new("$result = RSTR_TO_WXSTR($input);"))
                .with(Direction::DirectorIn, MapCode::new("$input = WXSTR_TO_RSTR($1);")),
        ),
        string_typecheck(
            Typemap::new(&["wxString*"])
                .rb_type("String")
                .with(
                    Direction::In,
                    MapCode::new("tmp = RSTR_TO_WXSTR($input); $1 = &tmp;").temp("wxString tmp"),
                )
                .with(Direction::Out, MapCode::new("$result = WXSTR_PTR_TO_RSTR($1);"))
                .with(Direction::DirectorIn, MapCode::new("$input = WXSTR_PTR_TO_RSTR($1);")),
        ),
        string_typecheck(
            Typemap::new(&["wxString"])
                .rb_type("String")
                .with(Direction::Out, MapCode::new("$result = WXSTR_TO_RSTR($1);"))
                .with(Direction::DirectorOut, MapCode::new("$result = RSTR_TO_WXSTR($input);"))
                .with(Direction::Varout, MapCode::new("$result = WXSTR_TO_RSTR($1);")),
        ),
        Typemap::new(&["void*"])
            .rb_type("Object")
            .with(Direction::In, MapCode::new("$1 = (void*)($input);"))
            .with(Direction::Out, MapCode::new("$result = (VALUE)($1);"))
            .typecheck_with("POINTER", "$1 = TRUE;"),
        Typemap::new(&["wxSize&"])
            .rb_type("Array<Integer>, Wx::Size")
            .with(Direction::In, MapCode::new(SIZE_POINT_IN))
            .typecheck_with("POINTER", SIZE_POINT_TYPECHECK),
        Typemap::new(&["wxPoint&"])
            .rb_type("Array<Integer>, Wx::Point")
            .with(Direction::In, MapCode::new(SIZE_POINT_IN))
            .typecheck_with("POINTER", SIZE_POINT_TYPECHECK),
        Typemap::new(&["wxItemKind"])
            .rb_type("Integer")
            .with(Direction::In, MapCode::new("$1 = (wxItemKind)NUM2INT($input);"))
            .with(Direction::Out, MapCode::new("$result = INT2NUM((int)$1);"))
            .typecheck_with(
                "INTEGER",
                "$1 = (TYPE($input) == T_FIXNUM && TYPE($input) != T_TRUE && TYPE($input) != T_FALSE);",
            ),
        Typemap::new(&[
            "int n, const wxString choices []",
            "int n, const wxString* choices",
            "int nItems, const wxString *items",
        ])
        .rb_type("Array<String>")
        .with(Direction::In, MapCode::new(STRING_ARRAY_IN).temp("wxString *arr"))
        .with(Direction::Default, MapCode::new("$1 = 0;\n$2 = NULL;"))
        .with(Direction::Freearg, MapCode::new("if ($2 != NULL) delete [] $2;"))
        .typecheck_with("STRING_ARRAY", "$1 = (TYPE($input) == T_ARRAY);"),
        Typemap::new(&["wxArrayString &"])
            .rb_type("Array<String>")
            .with(Direction::In, MapCode::new(ARRAY_STRING_IN).temp("wxArrayString tmp"))
            .typecheck_with("STRING_ARRAY", "$1 = (TYPE($input) == T_ARRAY);"),
        Typemap::new(&["wxArrayString"])
            .rb_type("Array<String>")
            .with(Direction::Out, MapCode::new(ARRAY_STRING_OUT)),
        Typemap::new(&["wxArrayInt&"])
            .rb_type("Array<Integer>")
            .with(Direction::In, MapCode::new(ARRAY_INT_IN).temp("wxArrayInt tmp"))
            .typecheck_with("INT32_ARRAY", "$1 = (TYPE($input) == T_ARRAY);"),
        Typemap::new(&["wxArrayInt"])
            .rb_type("Array<Integer>")
            .with(Direction::Out, MapCode::new(ARRAY_INT_OUT)),
    ];
    maps.extend(["wxEdge", "wxRelationship", "wxKeyCode"].map(enum_as_integer));
    maps.extend([
        Typemap::new(&["wxWindow* parent"])
            .rb_type("Wx::Window")
            .with(Direction::Check, MapCode::new(WINDOW_PARENT_CHECK)),
        Typemap::new(&["wxWindow*"])
            .rb_type("Wx::Window")
            .with(Direction::Out, MapCode::new("$result = wxRuby_WrapWxObjectInRuby($1);")),
        Typemap::new(&["wxSizer*"])
            .rb_type("Wx::Sizer")
            .with(Direction::Out, MapCode::new("$result = wxRuby_WrapWxObjectInRuby($1);")),
        Typemap::new(&["wxEvent &event"])
            .rb_type("Wx::Event")
            .with(Direction::DirectorIn, MapCode::new(EVENT_DIRECTORIN))
            .with(Direction::In, MapCode::new("$1 = (wxEvent*)DATA_PTR($input);")),
    ]);
    maps
}

/// The shared `%apply` rules
pub fn common_applies() -> Vec<MapApply> {
    vec![
        MapApply {
            from: "int *OUTPUT".to_string(),
            to: ["int * x", "int * y", "int * w", "int * h", "int * descent", "int * externalLeading"]
                .map(String::from)
                .to_vec(),
        },
        MapApply {
            from: "int *OUTPUT".to_string(),
            to: ["wxCoord * width", "wxCoord * height", "wxCoord * heightLine"]
                .map(String::from)
                .to_vec(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ParamDef;

    #[test]
    fn test_common_rules_are_valid() {
        for map in common_typemaps() {
            map.validate().unwrap();
        }
    }

    #[test]
    fn test_enum_as_integer_rules() {
        let maps = common_typemaps();
        let key_code = maps
            .iter()
            .find(|m| m.matches_param(&ParamDef::new("key", "wxKeyCode")))
            .unwrap();
        assert_eq!(key_code.rb_type.as_deref(), Some("Integer"));
        assert!(key_code.to_swig().contains("precedence=SWIG_TYPECHECK_INT32"));
    }
}
