//! Top-level command catalog.
//!
//! Commands listed here are known to the runner even before any handler is installed.
//! Names outside the catalog still resolve, so a local override can introduce a new command.

/// One top-level command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub summary: &'static str,
    /// Remote-capable commands live in a separately versioned companion package and
    /// are never resolved from the local overrides directory.
    pub remote: bool,
}

const fn local(name: &'static str, summary: &'static str) -> CatalogEntry {
    CatalogEntry {
        name,
        summary,
        remote: false,
    }
}

pub const TOP_COMMANDS: &[CatalogEntry] = &[
    local("build", "Build the application for production"),
    local("clean", "Remove build artifacts and caches"),
    local("dev", "Start a development server with hot reload"),
    local("help", "List available commands and where they resolve"),
    local("info", "Display environment and runner information"),
    local("init", "Initialize a new project from a starter kit"),
    local("mode", "Add or remove a build mode"),
    local("new", "Scaffold a component, page or layout"),
    local("serve", "Serve a built application"),
    CatalogEntry {
        name: "test",
        summary: "Run the test harness",
        remote: true,
    },
];

pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    TOP_COMMANDS.iter().find(|entry| entry.name == name)
}

pub fn is_top_command(name: &str) -> bool {
    lookup(name).is_some()
}
