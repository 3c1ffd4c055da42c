//! Test helpers: executable shell scripts standing in for the external tool.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write fake tool");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    path
}

/// Listing printed before anything is installed.
pub const BASE_LISTING: &str = "\
These templates matched your input:

Template Name        Short Name  Language    Tags
-------------------  ----------  ----------  --------------
Console Application  console     [C#],F#,VB  Common/Console
Class Library        classlib    [C#],F#,VB  Common/Library
";

/// Extra row appended once the fake `--install` has run.
pub const INSTALLED_ROW: &str = "Steeltoe Web API     stwebapi    [C#]        Steeltoe/Web\n";

/// Writes a fake code-generation tool into `dir` that understands the
/// `new --list`, `new --install <id>`, `new <template> --help` and
/// `new <template> [--output=<name> | --output <name>] ...` invocations.
///
/// - `console` writes three files under the output directory.
/// - `classlib` and `stwebapi` write one file whose content names the template.
/// - `empty` succeeds without writing anything.
/// - anything else fails with `unknown template` on stderr.
///
/// Every template invocation appends its working directory to
/// `state/workspaces.txt`.
pub fn fake_tool(dir: &Path) -> PathBuf {
    let state = dir.join("state");
    fs::create_dir_all(&state).expect("create fake tool state dir");
    fs::write(state.join("listing.txt"), BASE_LISTING).expect("write listing");
    fs::write(state.join("installed.txt"), INSTALLED_ROW).expect("write installed row");

    let body = format!(
        r#"STATE='{state}'
[ "$1" = "new" ] || {{ printf 'usage: tool new ...' >&2; exit 2; }}
shift
case "$1" in
  --list)
    cat "$STATE/listing.txt"
    exit 0
    ;;
  --install)
    if [ "$2" = "Steeltoe.Templates" ]; then
      cat "$STATE/installed.txt" >> "$STATE/listing.txt"
      echo "installed $2"
      exit 0
    fi
    printf 'package %s not found' "$2" >&2
    exit 1
    ;;
esac
template="$1"
shift
pwd >> "$STATE/workspaces.txt"
out=Sample
prev=""
for arg in "$@"; do
  case "$arg" in
    --help) echo "Usage: new $template [options]"; exit 0 ;;
    --output=*) out="${{arg#--output=}}" ;;
  esac
  [ "$prev" = "--output" ] && out="$arg"
  prev="$arg"
done
case "$template" in
  console)
    mkdir -p "$out/Properties"
    echo "class Program {{}}" > "$out/Program.cs"
    echo "<Project>$*</Project>" > "$out/$out.csproj"
    echo "{{}}" > "$out/Properties/launchSettings.json"
    ;;
  classlib|stwebapi)
    mkdir -p "$out"
    echo "$template" > "$out/template.txt"
    ;;
  empty)
    ;;
  *)
    printf 'unknown template' >&2
    exit 1
    ;;
esac
"#,
        state = state.display()
    );
    write_script(dir, "dotnet", &body)
}
