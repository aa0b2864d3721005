//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};

use rdasave::catalog::parse_item;
use rdasave::edit::Splice;
use rdasave::observe::{NoObserver, Observer, TableKind};
use rdasave::read::Container;
use rdasave::{EditOptions, NameEncoding, SaveEditor};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{ExtractSummary, SaveSummary, create_formatter};

/// Options shared by every command.
pub struct Context {
    pub format: OutputFormat,
    pub verbose: bool,
    pub target: String,
    pub names: NameEncoding,
}

impl Context {
    fn options(&self) -> EditOptions {
        EditOptions::new()
            .target_file(self.target.clone())
            .name_encoding(self.names)
    }

    fn observer(&self) -> Box<dyn Observer> {
        if self.verbose {
            Box::new(StderrObserver)
        } else {
            Box::new(NoObserver)
        }
    }
}

/// Configuration for the activate command.
pub struct ActivateConfig<'a> {
    pub context: &'a Context,
    pub save_path: &'a Path,
    pub items: &'a [String],
    pub output: Option<&'a Path>,
    pub level: u32,
}

/// List command implementation
pub fn list(context: &Context, save_path: &Path) -> ExitCode {
    let formatter = create_formatter(context.format);

    let container = match open_container(save_path, context.names) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let entries = match container.entries() {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error reading directory: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_list(&entries));

    ExitCode::Success
}

/// Show command implementation
pub fn show(context: &Context, save_path: &Path) -> ExitCode {
    let formatter = create_formatter(context.format);

    let editor = match open_editor(save_path, context.options(), context) {
        Ok(e) => e,
        Err(code) => return code,
    };

    let summary = SaveSummary {
        entry: editor.entry(),
        payload_size: editor.payload().len(),
        node_count: editor.tree().len(),
        counter: editor.bookkeeping().counter.and_then(|c| c.value),
        items: editor.active_items(),
    };
    print!("{}", formatter.format_show(&summary));

    ExitCode::Success
}

/// Dump command implementation
pub fn dump(context: &Context, save_path: &Path) -> ExitCode {
    let formatter = create_formatter(context.format);

    let editor = match open_editor(save_path, context.options(), context) {
        Ok(e) => e,
        Err(code) => return code,
    };

    print!("{}", formatter.format_dump(editor.tree()));

    ExitCode::Success
}

/// Extract command implementation
pub fn extract(context: &Context, save_path: &Path, output: &Path, raw: bool) -> ExitCode {
    let formatter = create_formatter(context.format);

    let editor = match open_editor(save_path, context.options(), context) {
        Ok(e) => e,
        Err(code) => return code,
    };

    let data = if raw {
        editor.compressed()
    } else {
        editor.payload()
    };
    if let Err(e) = std::fs::write(output, data) {
        eprintln!("Error writing {}: {}", output.display(), e);
        return ExitCode::IoError;
    }

    let summary = ExtractSummary {
        entry: editor.entry(),
        output,
        bytes_written: data.len(),
        raw,
    };
    print!("{}", formatter.format_extract(&summary));

    ExitCode::Success
}

/// Activate command implementation
pub fn activate(config: &ActivateConfig<'_>) -> ExitCode {
    let context = config.context;
    let formatter = create_formatter(context.format);

    let items = match config
        .items
        .iter()
        .map(|item| parse_item(item))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let options = match context.options().compression_level(config.level) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let mut editor = match open_editor(config.save_path, options, context) {
        Ok(e) => e,
        Err(code) => return code,
    };

    let mut observer = context.observer();
    let result = match editor.activate_with(&items, observer.as_mut()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error activating items: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let output = config
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(config.save_path));

    if result.changed() {
        if let Err(e) = editor.write_path(&output) {
            eprintln!("Error writing {}: {}", output.display(), e);
            return error_to_exit_code(&e);
        }
    }

    print!("{}", formatter.format_activate(&result, Some(output.as_path())));

    ExitCode::Success
}

/// Catalog command implementation
pub fn catalog(context: &Context) -> ExitCode {
    print!("{}", create_formatter(context.format).format_catalog());
    ExitCode::Success
}

/// Returns `<stem>_dlc_activated.a7s` next to `save_path`.
fn default_output_path(save_path: &Path) -> PathBuf {
    let stem = save_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "save".to_string());
    save_path.with_file_name(format!("{}_dlc_activated.a7s", stem))
}

fn open_container(path: &Path, names: NameEncoding) -> Result<Container, ExitCode> {
    Container::open_path(path, names).map_err(|e| {
        eprintln!("Error opening save: {}", e);
        error_to_exit_code(&e)
    })
}

fn open_editor(
    path: &Path,
    options: EditOptions,
    context: &Context,
) -> Result<SaveEditor, ExitCode> {
    let bytes = std::fs::read(path).map_err(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        ExitCode::IoError
    })?;
    let mut observer = context.observer();
    SaveEditor::open_with(bytes, options, observer.as_mut()).map_err(|e| {
        eprintln!("Error opening save: {}", e);
        error_to_exit_code(&e)
    })
}

/// Prints pipeline events to stderr.
struct StderrObserver;

impl Observer for StderrObserver {
    fn on_block(&mut self, offset: usize, file_count: u32) {
        eprintln!("block      {:#010x}  {} files", offset, file_count);
    }

    fn on_entry(&mut self, name: &str, matched: bool) {
        if matched {
            eprintln!("found      {}", name);
        }
    }

    fn on_table(&mut self, kind: TableKind, offset: usize, count: u32) {
        eprintln!("{:<10} {:#010x}  {} names", format!("{} table", kind), offset, count);
    }

    fn on_item_skipped(&mut self, value: u32) {
        eprintln!("skip       {:#010x}", value);
    }

    fn on_splice(&mut self, splice: &Splice) {
        eprintln!(
            "{:<10} {:#010x}  {} bytes",
            splice.kind(),
            splice.offset(),
            splice.len()
        );
    }

    fn on_commit(&mut self, data_pointer: u64, size: u64) {
        eprintln!("commit     {:#010x}  {} bytes", data_pointer, size);
    }
}
