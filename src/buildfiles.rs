//! node-gyp Build Files
//!
//! `binding.gyp` is fixed for every addon. `include.gypi` points node-gyp at
//! the source directory and asks `@stdlib/utils/library-manifest` to expand the
//! generated `manifest.json` into include dirs, sources, and libraries.

use std::path::Path;

/// File name of the generated glue source.
pub const ADDON_SOURCE: &str = "addon.c";

/// Default module used to resolve `manifest.json`.
pub const DEFAULT_LIBRARY_MANIFEST: &str = "@stdlib/utils/library-manifest";

/// The `binding.gyp` document.
const BINDING_GYP: &str = r#"
{
  # List of files to include in this file:
  'includes': [
    './include.gypi',
  ],

  # Define variables to be used throughout the configuration for all targets:
  'variables': {
    # Target name should match the add-on export name:
    'addon_target_name%': 'addon',

    # Set variables based on the host OS:
    'conditions': [
      [
        'OS=="win"',
        {
          # Define the object file suffix:
          'obj': 'obj',
        },
        {
          # Define the object file suffix:
          'obj': 'o',
        }
      ], # end condition (OS=="win")
    ], # end conditions
  }, # end variables

  # Define compile targets:
  'targets': [

    # Target to generate an add-on:
    {
      # The target name should match the add-on export name:
      'target_name': '<(addon_target_name)',

      # Define dependencies:
      'dependencies': [],

      # Define directories which contain relevant include headers:
      'include_dirs': [
        # Local include directory:
        '<@(include_dirs)',
      ],

      # List of source files:
      'sources': [
        '<@(src_files)',
      ],

      # Settings which should be applied when a target's object files are used as linker input:
      'link_settings': {
        # Define libraries:
        'libraries': [
          '<@(libraries)',
        ],

        # Define library directories:
        'library_dirs': [
          '<@(library_dirs)',
        ],
      },

      # C/C++ compiler flags:
      'cflags': [
        # Enable commonly used warning options:
        '-Wall',

        # Aggressive optimization:
        '-O3',
      ],

      # C specific compiler flags:
      'cflags_c': [
        # Specify the C standard to which a program is expected to conform:
        '-std=c99',
      ],

      # C++ specific compiler flags:
      'cflags_cpp': [
        # Specify the C++ standard to which a program is expected to conform:
        '-std=c++11',
      ],

      # Linker flags:
      'ldflags': [],

      # Apply conditions based on the host OS:
      'conditions': [
        [
          'OS=="mac"',
          {
            # Linker flags:
            'ldflags': [
              '-undefined dynamic_lookup',
              '-Wl,-no-pie',
              '-Wl,-search_paths_first',
            ],
          },
        ], # end condition (OS=="mac")
        [
          'OS!="win"',
          {
            # C/C++ flags:
            'cflags': [
              # Generate platform-independent code:
              '-fPIC',
            ],
          },
        ], # end condition (OS!="win")
      ], # end conditions
    }, # end target <(addon_target_name)

    # Target to copy a generated add-on to a standard location:
    {
      'target_name': 'copy_addon',

      # Declare that the output of this target is not linked:
      'type': 'none',

      # Define dependencies:
      'dependencies': [
        # Require that the add-on be generated before building this target:
        '<(addon_target_name)',
      ],

      # Define a list of actions:
      'actions': [
        {
          'action_name': 'copy_addon',
          'message': 'Copying addon...',

          # Explicitly list the inputs in the command-line invocation below:
          'inputs': [],

          # Declare the expected outputs:
          'outputs': [
            '<(addon_output_dir)/<(addon_target_name).node',
          ],

          # Define the command-line invocation:
          'action': [
            'cp',
            '<(PRODUCT_DIR)/<(addon_target_name).node',
            '<(addon_output_dir)/<(addon_target_name).node',
          ],
        },
      ], # end actions
    }, # end target copy_addon
  ], # end targets
}
"#;

/// Manifest fields expanded into `include.gypi` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestQuery {
    Include,
    Src,
    Libraries,
    Libpath,
}

impl ManifestQuery {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestQuery::Include => "include",
            ManifestQuery::Src => "src",
            ManifestQuery::Libraries => "libraries",
            ManifestQuery::Libpath => "libpath",
        }
    }
}

/// Inputs for `include.gypi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GypiSettings {
    /// Directory holding the C source (and the built addon)
    pub source_dir: String,
    /// Directory holding the generated addon.c
    pub addon_dir: String,
    /// Path of the written manifest.json
    pub manifest_path: String,
    /// Module (or resolved path) exporting the manifest resolver
    pub library_manifest: String,
    /// Base directory for resolving `@stdlib/*` dependencies
    pub stdlib_basedir: String,
}

impl GypiSettings {
    /// Settings for a source living in `source_dir` with addon.c and the
    /// manifest written to `out_dir`.
    pub fn new(source_dir: &Path, out_dir: &Path, stdlib_basedir: &Path) -> Self {
        Self {
            source_dir: posix(source_dir),
            addon_dir: posix(out_dir),
            manifest_path: posix(&out_dir.join("manifest.json")),
            library_manifest: DEFAULT_LIBRARY_MANIFEST.to_string(),
            stdlib_basedir: posix(stdlib_basedir),
        }
    }

    pub fn with_library_manifest(mut self, module: impl Into<String>) -> Self {
        self.library_manifest = module.into();
        self
    }

    /// gyp command expansion printing one manifest field, one entry per line.
    pub fn query(&self, field: ManifestQuery) -> String {
        format!(
            "<!@(node -e \"var arr = require('{}')('{}',{{}},{{'basedir':'{}','paths':'posix'}}).{}; for ( var i = 0; i < arr.length; i++ ) {{ console.log( arr[ i ] ); }}\")",
            self.library_manifest,
            self.manifest_path,
            self.stdlib_basedir,
            field.as_str()
        )
    }
}

fn posix(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.is_empty() {
        ".".to_string()
    } else {
        text
    }
}

/// Content of `binding.gyp`.
pub fn binding_gyp() -> &'static str {
    BINDING_GYP
}

/// Content of `include.gypi`.
pub fn include_gypi(settings: &GypiSettings) -> String {
    let source_dir = settings.source_dir.trim_end_matches('/');
    let addon_dir = settings.addon_dir.trim_end_matches('/');
    let mut output = String::new();

    output.push_str("{\n");
    output.push_str("  # Define variables to be used throughout the configuration for all targets:\n");
    output.push_str("  'variables': {\n");

    output.push_str("    # Source directory:\n");
    output.push_str(&format!("    'src_dir': '{}/',\n\n", source_dir));

    output.push_str("    # Generated add-on source directory:\n");
    output.push_str(&format!("    'addon_dir': '{}/',\n\n", addon_dir));

    output.push_str("    # Include directories:\n");
    output.push_str("    'include_dirs': [\n");
    output.push_str(&format!("      '{}',\n", settings.query(ManifestQuery::Include)));
    output.push_str("    ],\n\n");

    output.push_str("    # Add-on destination directory:\n");
    output.push_str(&format!("    'addon_output_dir': '{}/',\n\n", source_dir));

    output.push_str("    # Source files:\n");
    output.push_str("    'src_files': [\n");
    output.push_str(&format!("      '<(addon_dir)/{}',\n", ADDON_SOURCE));
    output.push_str(&format!("      '{}',\n", settings.query(ManifestQuery::Src)));
    output.push_str("    ],\n\n");

    output.push_str("    # Library dependencies:\n");
    output.push_str("    'libraries': [\n");
    output.push_str(&format!("      '{}',\n", settings.query(ManifestQuery::Libraries)));
    output.push_str("    ],\n\n");

    output.push_str("    # Library directories:\n");
    output.push_str("    'library_dirs': [\n");
    output.push_str(&format!("      '{}',\n", settings.query(ManifestQuery::Libpath)));
    output.push_str("    ],\n");

    output.push_str("  }, # end variables\n");
    output.push_str("}\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings() -> GypiSettings {
        GypiSettings::new(
            &PathBuf::from("/work/src"),
            &PathBuf::from("/work/out"),
            &PathBuf::from("/work/node_modules/@stdlib/stdlib"),
        )
    }

    #[test]
    fn test_binding_gyp_targets() {
        let gyp = binding_gyp();
        assert!(gyp.contains("'./include.gypi'"));
        assert!(gyp.contains("'addon_target_name%': 'addon'"));
        assert!(gyp.contains("'target_name': 'copy_addon'"));
        assert!(gyp.contains("'-std=c99'"));
        assert!(gyp.contains("'-undefined dynamic_lookup'"));
    }

    #[test]
    fn test_query_command() {
        let query = settings().query(ManifestQuery::Src);
        assert_eq!(
            query,
            "<!@(node -e \"var arr = require('@stdlib/utils/library-manifest')('/work/out/manifest.json',{},{'basedir':'/work/node_modules/@stdlib/stdlib','paths':'posix'}).src; for ( var i = 0; i < arr.length; i++ ) { console.log( arr[ i ] ); }\")"
        );
    }

    #[test]
    fn test_include_gypi_sections() {
        let gypi = include_gypi(&settings());
        assert!(gypi.starts_with("{\n"));
        assert!(gypi.contains("'src_dir': '/work/src/',"));
        assert!(gypi.contains("'addon_output_dir': '/work/src/',"));
        assert!(gypi.contains("'addon_dir': '/work/out/',"));
        assert!(gypi.contains("'<(addon_dir)/addon.c',"));
        for field in ["include", "src", "libraries", "libpath"] {
            assert!(gypi.contains(&format!("'paths':'posix'}}).{};", field)));
        }
        assert!(gypi.ends_with("}, # end variables\n}\n"));
    }

    #[test]
    fn test_custom_library_manifest() {
        let gypi = include_gypi(
            &settings().with_library_manifest("/opt/lib/library-manifest/lib/index.js"),
        );
        assert!(gypi.contains("require('/opt/lib/library-manifest/lib/index.js')"));
        assert!(!gypi.contains(DEFAULT_LIBRARY_MANIFEST));
    }

    #[test]
    fn test_relative_source_dir() {
        let settings = GypiSettings::new(Path::new(""), Path::new("."), Path::new("stdlib"));
        assert_eq!(settings.source_dir, ".");
        assert_eq!(settings.addon_dir, ".");
        assert!(include_gypi(&settings).contains("'src_dir': './',"));
        assert!(include_gypi(&settings).contains("'addon_dir': './',"));
    }
}
