use codebox_core::exec::ExecutionGateway;
use codebox_core::language::templates::{ProblemRef, TemplateProvider};
use codebox_core::workspace::Node;
use codebox_core::{ExecutionRequest, SessionState, WorkspaceStore};

pub enum CommandResult {
    Handled {
        msg: String,
    },

    /// A command to exit the app was detected.
    Exit,
}

fn handled(msg: impl Into<String>) -> CommandResult {
    CommandResult::Handled { msg: msg.into() }
}

const USAGE: &str = "\
/tree                      show the whole workspace
/ls [path]                 list a folder
/cat <path>                print a file
/new <path>                create a file (language from extension)
/mkdir <path>              create a folder
/write <path> <text>       save content to a file
/touch <path>              mark a file as having unsaved changes
/reset <path>              restore a file to its boilerplate
/rename <path> <name>      rename a file or folder
/mv <path> <folder>        move a node into another folder
/rm <path>                 delete a file or folder (recursive)
/open <path>               open a file in a tab
/tabs                      list open tabs
/close [path]              close a tab (active one by default)
/run [path] [stdin]        execute a file (active one by default)
/out <path>                show the last output recorded for a file
/starter <path> <title>    seed a file from a problem's starter template
/exit                      quit";

pub async fn handle(
    store: &mut WorkspaceStore,
    session: &mut SessionState,
    gateway: &ExecutionGateway,
    templates: &TemplateProvider,
    input: &str,
) -> CommandResult {
    let mut parts = input.trim().split_whitespace();
    let Some(command) = parts.next() else {
        return handled("");
    };
    let args: Vec<&str> = parts.collect();

    match command {
        "/exit" | "/quit" => CommandResult::Exit,
        "/help" => handled(USAGE),

        "/tree" => {
            let mut out = String::from("/");
            render_tree(store, "/", 1, &mut out);
            handled(out)
        }

        "/ls" => {
            let path = args.first().copied().unwrap_or("/");
            let children = store.list(path);
            if children.is_empty() && !store.is_folder(path) {
                return handled(format!("no folder at '{path}'"));
            }
            let lines: Vec<String> = children.iter().map(|n| entry_label(n)).collect();
            handled(lines.join("\n"))
        }

        "/cat" => {
            let Some(path) = args.first() else {
                return handled("usage: /cat <path>");
            };
            match store.read_file(path) {
                Some(node) => handled(node.content().unwrap_or_default().to_string()),
                None => handled(format!("no file at '{path}'")),
            }
        }

        "/new" => {
            let Some(path) = args.first() else {
                return handled("usage: /new <path>");
            };
            let (parent, name) = split_path(path);
            match store.create_file(&parent, name, None) {
                Ok(_) => handled(format!("created {path}")),
                Err(e) => handled(e.to_string()),
            }
        }

        "/mkdir" => {
            let Some(path) = args.first() else {
                return handled("usage: /mkdir <path>");
            };
            let (parent, name) = split_path(path);
            match store.create_folder(&parent, name) {
                Ok(_) => handled(format!("created {path}/")),
                Err(e) => handled(e.to_string()),
            }
        }

        "/write" => {
            let Some(path) = args.first() else {
                return handled("usage: /write <path> <text>");
            };
            let content = format!("{}\n", args[1..].join(" "));
            if store.write_file(path, &content) {
                handled(format!("saved {path}"))
            } else {
                handled(format!("no file at '{path}'"))
            }
        }

        "/touch" => {
            let Some(path) = args.first() else {
                return handled("usage: /touch <path>");
            };
            if store.mark_file_unsaved(path) {
                handled(format!("{path} marked unsaved"))
            } else {
                handled(format!("no file at '{path}'"))
            }
        }

        "/reset" => {
            let Some(path) = args.first() else {
                return handled("usage: /reset <path>");
            };
            if store.reset_file(path) {
                handled(format!("{path} reset to boilerplate"))
            } else {
                handled(format!("no file at '{path}'"))
            }
        }

        "/rename" => {
            let (Some(path), Some(name)) = (args.first(), args.get(1)) else {
                return handled("usage: /rename <path> <name>");
            };
            match store.rename(path, name) {
                Ok(()) => {
                    session.refresh(store);
                    handled(format!("renamed {path} -> {name}"))
                }
                Err(e) => handled(e.to_string()),
            }
        }

        "/mv" => {
            let (Some(path), Some(target)) = (args.first(), args.get(1)) else {
                return handled("usage: /mv <path> <folder>");
            };
            match store.move_node(path, target) {
                Ok(()) => {
                    session.refresh(store);
                    handled(format!("moved {path} -> {target}"))
                }
                Err(e) => handled(e.to_string()),
            }
        }

        "/rm" => {
            let Some(path) = args.first() else {
                return handled("usage: /rm <path>");
            };
            if store.delete(path) {
                gateway.forget_output(path);
                session.refresh(store);
                handled(format!("deleted {path}"))
            } else {
                handled(format!("no such path '{path}'"))
            }
        }

        "/open" => {
            let Some(path) = args.first() else {
                return handled("usage: /open <path>");
            };
            match store.read_file(path) {
                Some(node) => {
                    session.open(node);
                    handled(format!("opened {path}"))
                }
                None => handled(format!("no file at '{path}'")),
            }
        }

        "/tabs" => {
            if session.tabs().is_empty() {
                return handled("no open tabs");
            }
            let active = session.active().cloned();
            let lines: Vec<String> = session
                .tabs()
                .iter()
                .map(|tab| {
                    let marker = if Some(&tab.file_id) == active.as_ref() {
                        "*"
                    } else {
                        " "
                    };
                    format!("{marker} {}", tab.file_path)
                })
                .collect();
            handled(lines.join("\n"))
        }

        "/close" => {
            let id = match args.first() {
                Some(path) => store.find_by_path(path).map(|n| n.id.clone()),
                None => session.active().cloned(),
            };
            match id {
                Some(id) => {
                    if session.close(&id) {
                        handled("closed")
                    } else {
                        handled("no such tab")
                    }
                }
                None => handled("no such tab"),
            }
        }

        "/run" => {
            let path = match args.first() {
                Some(path) => path.to_string(),
                None => match session.active_tab() {
                    Some(tab) => tab.file_path.clone(),
                    None => return handled("nothing to run: no active tab"),
                },
            };
            let Some(node) = store.read_file(&path) else {
                return handled(format!("no file at '{path}'"));
            };
            let (Some(language), Some(content)) = (node.language(), node.content()) else {
                return handled(format!("no file at '{path}'"));
            };

            let stdin = args.get(1..).unwrap_or_default().join(" ");
            let request = ExecutionRequest::new(language, content).with_stdin(stdin);
            let result = gateway.execute_for_file(&path, request).await;

            let mut msg = if result.output.is_empty() {
                "(no output)".to_string()
            } else {
                result.output.clone()
            };
            if !result.success {
                msg.push_str("\n[status: Error]");
            }
            handled(msg)
        }

        "/starter" => {
            let Some(path) = args.first() else {
                return handled("usage: /starter <path> <title>");
            };
            let rest = args.get(1..).unwrap_or_default();
            if rest.is_empty() {
                return handled("usage: /starter <path> <title>");
            }
            let Some(node) = store.read_file(path) else {
                return handled(format!("no file at '{path}'"));
            };
            let Some(language) = node.language() else {
                return handled(format!("no file at '{path}'"));
            };

            let title = rest.join(" ");
            let problem = ProblemRef {
                slug: title.to_lowercase().replace(' ', "-"),
                title,
            };
            let starter = templates.starter(language, Some(&problem)).await;
            let path = path.to_string();
            store.write_file(&path, &starter);
            store.mark_file_unsaved(&path);
            handled(format!("seeded {path} from starter template"))
        }

        "/out" => {
            let Some(path) = args.first() else {
                return handled("usage: /out <path>");
            };
            match gateway.cached_output(path) {
                Some(output) if !output.is_empty() => handled(output),
                _ => handled(format!("no recorded output for '{path}'")),
            }
        }

        other => handled(format!("unknown command '{other}' - try /help")),
    }
}

fn entry_label(node: &Node) -> String {
    if node.is_folder() {
        format!("{}/", node.name)
    } else if node.saved() == Some(false) {
        format!("{} *", node.name)
    } else {
        node.name.clone()
    }
}

fn render_tree(store: &WorkspaceStore, path: &str, depth: usize, out: &mut String) {
    for child in store.list(path) {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
        out.push_str(&entry_label(child));
        if child.is_folder() {
            render_tree(store, &child.path, depth + 1, out);
        }
    }
}

/// Splits "/src/a.py" into ("/src", "a.py"); names without a folder go
/// under the root.
fn split_path(path: &str) -> (String, &str) {
    let trimmed = path.trim_end_matches('/');
    let without_root = trimmed.strip_prefix('/').unwrap_or(trimmed);
    match without_root.rsplit_once('/') {
        Some((parent, name)) => (format!("/{parent}"), name),
        None => ("/".to_string(), without_root),
    }
}
