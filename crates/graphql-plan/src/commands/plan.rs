use crate::output_utils;
use crate::Cli;
use crate::CommandResult;
use crate::RunnableCommand;
use libgraphql_plan::document::ExecutableDocumentBuilder;
use libgraphql_plan::plan::CompiledOperation;
use libgraphql_plan::plan::FragmentIndex;
use libgraphql_plan::plan::OptimizerPipeline;
use libgraphql_plan::schema::SchemaBuilder;
use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use walkdir::WalkDir;

#[derive(Debug, clap::Args)]
pub(crate) struct PlanCmd {
    #[arg(
        help="Name of the operation to compile. May be omitted when the \
             document contains exactly one operation.",
        long,
    )]
    operation_name: Option<String>,

    #[arg(
        help="Path to the GraphQL document containing the operation.",
        name="OPERATION_FILE",
    )]
    operation_file: PathBuf,

    #[arg(
        help="Paths to one or more GraphQL schema files or directories \
             containing GraphQL schema files.",
        long="schema",
        required=true,
        value_name="FILE_OR_DIR",
    )]
    schema_paths: Vec<PathBuf>,

    #[arg(
        default_values_t=[
            "graphql".to_string(),
            "graphqls".to_string(),
        ],
        help="Set of file extensions to filter to when searching for schema \
             files within a directory.",
        long,
        value_delimiter = ',',
    )]
    schema_file_exts: Vec<String>,
}
impl PlanCmd {
    /// Find all schema files recursively located at or under each path
    /// passed as a `--schema` arg.
    fn find_schema_files(&self) -> Result<Vec<PathBuf>, Vec<Box<dyn Error>>> {
        let mut errors: Vec<Box<dyn Error>> = vec![];

        let schema_file_exts: HashSet<String> =
            self.schema_file_exts.iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect();

        log::debug!(
            "Scanning {} schema paths...",
            self.schema_paths.len(),
        );
        let mut file_paths = vec![];
        for path in &self.schema_paths {
            // A file named explicitly is loaded whatever its extension.
            if path.is_file() {
                match std::fs::canonicalize(path) {
                    Ok(path) => file_paths.push(path),
                    Err(e) => errors.push(Box::new(e)),
                }
                continue;
            }

            for entry in WalkDir::new(path.as_path()).follow_links(true) {
                match entry {
                    Ok(entry) => {
                        let path = entry.path();
                        if !entry.file_type().is_file() {
                            log::trace!("Skipping non-file: {path:#?}.");
                            continue;
                        }

                        log::trace!("Found file at {path:#?}.");
                        if let Some(ext) = path.extension().map(|s| s.to_string_lossy())
                            && schema_file_exts.contains(&*ext) {
                            match std::fs::canonicalize(path) {
                                Ok(path) => file_paths.push(path),
                                Err(e) => errors.push(Box::new(e)),
                            }
                        }
                    },

                    Err(e) => {
                        log::trace!(
                            "Encountered an error while iterating recursive \
                            filesystem entities at/under {path:#?}."
                        );
                        errors.push(Box::new(e));
                    },
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        // Directory walk order is platform-dependent and type definition
        // order is observable in the plan.
        file_paths.sort();
        file_paths.dedup();

        log::debug!("Found {} schema files.", file_paths.len());
        Ok(file_paths)
    }
}

#[inherent::inherent]
impl RunnableCommand for PlanCmd {
    pub async fn run(self, _cli: &Cli) -> CommandResult {
        let schema_files = match self.find_schema_files() {
            Ok(schema_files) => schema_files,
            Err(errors) => return CommandResult::failure(format_args!(
                "{} Errors locating schema files: {errors:#?}",
                output_utils::RED_X,
            )),
        };

        let schema = match SchemaBuilder::from_files(&schema_files)
            .and_then(|builder| builder.build()) {
            Ok(schema) => schema,
            Err(e) => return CommandResult::failure(format_args!(
                "{} Error building schema: {e}",
                output_utils::RED_X,
            )),
        };

        let document = match ExecutableDocumentBuilder::from_file(&self.operation_file)
            .and_then(|builder| builder.build()) {
            Ok(document) => Arc::new(document),
            Err(errors) => return CommandResult::failure(format_args!(
                "{} Errors loading {:#?}: {errors:#?}",
                output_utils::RED_X,
                self.operation_file,
            )),
        };

        let fragments = match FragmentIndex::new(&document) {
            Ok(fragments) => fragments,
            Err(errors) => return CommandResult::failure(format_args!(
                "{} Invalid fragment definitions: {}",
                output_utils::RED_X,
                errors.iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        };

        let operation = CompiledOperation::compile(
            self.operation_file.to_string_lossy(),
            &schema,
            document,
            &fragments,
            self.operation_name.as_deref(),
            &OptimizerPipeline::new(),
        );
        match operation {
            Ok(operation) => {
                log::info!(
                    "{} Compiled {} selection(s) for root type `{}`.",
                    output_utils::GREEN_CHECK,
                    operation.selection_count(),
                    operation.root_type().name(),
                );
                CommandResult::success(format_args!("{}", operation.print().trim_end()))
            },

            Err(e) => CommandResult::failure(format_args!(
                "{} Error compiling operation: {e}",
                output_utils::RED_X,
            )),
        }
    }
}
