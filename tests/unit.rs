//! Behaviour of the viewer with external tools and the network faked out

use gman::{
    Browser, Captured, CommandLine, Config, Error, Fetcher, IndexStatus, Navigation, Outcome,
    StlIndex, ToolInvoker, Viewport,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Records every command and answers from a closure.
struct FakeInvoker {
    calls: RefCell<Vec<CommandLine>>,
    respond: Box<dyn Fn(&CommandLine) -> String>,
}

impl FakeInvoker {
    fn new(respond: impl Fn(&CommandLine) -> String + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    fn silent() -> Self {
        Self::new(|_| String::new())
    }

    fn calls(&self) -> Vec<CommandLine> {
        self.calls.borrow().clone()
    }
}

impl ToolInvoker for FakeInvoker {
    fn capture(&self, command: &CommandLine) -> gman::Result<Captured> {
        self.calls.borrow_mut().push(command.clone());
        Ok(Captured {
            stdout: (self.respond)(command).into_bytes(),
            success: true,
        })
    }
}

/// Serves canned bodies; any other URL fails like a refused connection.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl FakeFetcher {
    fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> gman::Result<u64> {
        self.requests.borrow_mut().push(url.to_string());
        match self.pages.get(url) {
            Some(body) => {
                sink.write_all(body.as_bytes())?;
                Ok(body.len() as u64)
            }
            None => Err(Error::Write(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn stl_root() -> PathBuf {
    manifest_path("tests/fixtures/stl-manual")
}

/// Config whose formatter "exists" (any real file will do, the fake never runs it).
fn formatter_config() -> Config {
    Config::default()
        .with_formatter(Some(manifest_path("Cargo.toml")))
        .with_stl_root(stl_root())
}

fn plain_config() -> Config {
    Config::default()
        .with_formatter(None)
        .with_stl_root(stl_root())
}

fn browser(config: Config, invoker: FakeInvoker) -> Browser<FakeInvoker, FakeFetcher> {
    Browser::new(config, invoker, FakeFetcher::default())
}

fn viewport() -> Viewport<Vec<u8>> {
    Viewport::new(Vec::new())
}

fn shown(viewport: Viewport<Vec<u8>>) -> String {
    String::from_utf8(viewport.into_inner()).unwrap()
}

mod man_pages {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;

    const RMAN_HTML: &str = "<a href='#toc'>Table of Contents</a><p>\n\
        <h2><a name='sect0' href='#toc0'>Name</a></h2>\nprintf\n\
        <hr><p>\n<ul><li><a name='toc0' href='#sect0'>Name</a></li></ul>\n";

    fn locating(page_file: PathBuf) -> FakeInvoker {
        FakeInvoker::new(move |command| {
            if command.args.iter().any(|arg| arg == "-w") {
                format!("{}\n/usr/share/man/man2/other.2.gz\n", page_file.display())
            } else {
                RMAN_HTML.to_string()
            }
        })
    }

    #[test]
    fn formatter_pipeline_locates_formats_and_tidies() {
        let dir = tempfile::tempdir().unwrap();
        let page_file = dir.path().join("printf.3");
        fs::write(&page_file, ".TH PRINTF 3\n.SH NAME\nprintf\n").unwrap();

        let mut browser = browser(formatter_config(), locating(page_file));
        let mut view = viewport();
        let outcome = browser.search("man:printf(3)", &mut view).unwrap();
        assert_eq!(outcome, Outcome::Shown);
        assert_eq!(shown(view), "\n<h2>Name</h2>\nprintf\n\n");

        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "man");
        assert_eq!(calls[0].args, ["-S", "3", "-w", "--", "printf"]);
        assert_eq!(calls[1].program, manifest_path("Cargo.toml").to_string_lossy());
        assert_eq!(calls[1].args, ["-f", "HTML", "-r", "man:%s(%s)", "-S"]);
        assert_eq!(
            calls[1].stdin.as_deref(),
            Some(&b".TH PRINTF 3\n.SH NAME\nprintf\n"[..])
        );
    }

    #[test]
    fn compressed_pages_are_inflated_before_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let page_file = dir.path().join("printf.3.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b".TH PRINTF 3\n").unwrap();
        fs::write(&page_file, encoder.finish().unwrap()).unwrap();

        let mut browser = browser(formatter_config(), locating(page_file));
        browser.search("printf", &mut viewport()).unwrap();

        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls[1].stdin.as_deref(), Some(&b".TH PRINTF 3\n"[..]));
    }

    #[test]
    fn unlocated_page_shows_nothing() {
        let mut browser = browser(formatter_config(), FakeInvoker::silent());
        let mut view = viewport();
        assert_eq!(browser.search("nosuchpage", &mut view).unwrap(), Outcome::Shown);
        assert_eq!(shown(view), "");
        assert_eq!(browser.man_pages().invoker().calls().len(), 1);
    }

    #[test]
    fn plain_fallback_strips_overstrike_and_skips_tidy() {
        let invoker = FakeInvoker::new(|_| "N\u{8}NA\u{8}AM\u{8}ME\u{8}E\n<hr><p> x </ul>\n".to_string());
        let mut browser = browser(plain_config(), invoker);
        assert!(!browser.man_pages().uses_formatter());

        let mut view = viewport();
        browser.search("man:ls(1)", &mut view).unwrap();
        assert_eq!(shown(view), "<pre>NAME\n&lt;hr&gt;&lt;p&gt; x &lt;/ul&gt;\n</pre>");

        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, ["-S", "1", "--", "ls"]);
    }

    #[test]
    fn search_text_reaches_man_as_one_argument() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        browser
            .search("printf'; rm -rf ~; echo '", &mut viewport())
            .unwrap();
        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls[0].args, ["-S", "2:3", "--", "printf'; rm -rf ~; echo '"]);
    }

    #[test]
    fn configured_man_program_and_sections_are_used() {
        let config = plain_config()
            .with_man_program("/opt/bin/man")
            .with_default_sections("3:3p");
        let mut browser = browser(config, FakeInvoker::silent());
        browser.search("pthread_create", &mut viewport()).unwrap();
        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls[0].program, "/opt/bin/man");
        assert_eq!(calls[0].args, ["-S", "3:3p", "--", "pthread_create"]);
    }

    #[test]
    fn option_like_search_text_is_a_page_name() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        browser.search("--help", &mut viewport()).unwrap();
        browser.search("-l/etc/passwd", &mut viewport()).unwrap();

        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls[0].args, ["-S", "2:3", "--", "--help"]);
        assert_eq!(calls[1].args, ["-S", "2:3", "--", "-l/etc/passwd"]);
    }

    #[test]
    fn option_like_page_is_located_after_end_of_options() {
        let mut browser = browser(formatter_config(), FakeInvoker::silent());
        browser.search("man:-k(1)", &mut viewport()).unwrap();
        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls[0].args, ["-S", "1", "-w", "--", "-k"]);
    }

    #[cfg(unix)]
    #[test]
    fn real_program_does_not_parse_page_as_option() {
        // `ls` stands in for `man`: it would print its version for a bare
        // `--version`, but after `--` it only looks for files of that name.
        let config = Config::default().with_formatter(None).with_man_program("ls");
        let mut browser = Browser::new(config, gman::SystemInvoker, FakeFetcher::default());
        let mut view = viewport();
        assert_eq!(browser.search("--version", &mut view).unwrap(), Outcome::Shown);

        let out = shown(view);
        assert!(!out.contains("coreutils"), "{out}");
        assert_eq!(out, "<pre></pre>");
    }
}

mod stl_index {
    use super::*;

    #[test]
    fn builds_from_index_page() {
        let index = StlIndex::build(stl_root(), "stl_index.html");
        assert_eq!(index.status(), &IndexStatus::Loaded { terms: 5 });
        assert_eq!(
            index.terms().collect::<Vec<_>>(),
            ["basic_string", "find", "string", "vector", "wstring"]
        );
        assert_eq!(index.lookup("vector"), Some(stl_root().join("Vector.html").as_path()));
        assert_eq!(index.lookup("Vector"), None);
    }

    #[test]
    fn string_typedefs_share_basic_string_page() {
        let index = StlIndex::build(stl_root(), "stl_index.html");
        let basic = index.lookup("basic_string").unwrap();
        assert_eq!(index.lookup("string"), Some(basic));
        assert_eq!(index.lookup("wstring"), Some(basic));
        assert_eq!(index.lookup("std::basic_string"), Some(basic));
    }

    #[test]
    fn missing_root_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("stl-manual");
        let index = StlIndex::build(&root, "stl_index.html");
        assert_eq!(index.status(), &IndexStatus::Missing { root });
        assert!(index.is_empty());
        assert_eq!(index.lookup("vector"), None);
        assert_eq!(index.page("vector").unwrap(), None);
    }

    #[test]
    fn missing_index_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let index = StlIndex::build(dir.path(), "stl_index.html");
        assert!(matches!(index.status(), IndexStatus::Unreadable { .. }));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn page_is_rebased_and_tidied() {
        let index = StlIndex::build(stl_root(), "stl_index.html");
        let html = index.page("vector").unwrap().unwrap();
        let base = format!("<HEAD><base href=\"{}\">", index.base_href());
        assert!(html.contains(&base), "{html}");
        assert!(index.base_href().starts_with("file://"));
        assert!(index.base_href().ends_with('/'));
        assert!(html.contains("\n<pre>iterator begin()</pre></td>\n"));
    }

    #[test]
    fn listed_page_missing_on_disk_is_an_error() {
        let index = StlIndex::build(stl_root(), "stl_index.html");
        assert!(matches!(index.page("find"), Err(Error::Io { .. })));
    }
}

mod dispatch {
    use super::*;

    #[test]
    fn bare_search_equals_default_section_man_url() {
        let mut bare = browser(plain_config(), FakeInvoker::silent());
        bare.search("printf", &mut viewport()).unwrap();
        let mut explicit = browser(plain_config(), FakeInvoker::silent());
        explicit.search("man:printf(2:3)", &mut viewport()).unwrap();

        assert_eq!(
            bare.man_pages().invoker().calls(),
            explicit.man_pages().invoker().calls()
        );
    }

    #[test]
    fn std_basic_string_and_string_show_same_page() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        let mut first = viewport();
        let mut second = viewport();
        browser.search("stl:std::basic_string", &mut first).unwrap();
        browser.search("stl:string", &mut second).unwrap();

        let first = shown(first);
        assert!(first.contains("<TITLE>basic_string&lt;charT, traits, Alloc&gt;</TITLE>"));
        assert_eq!(first, shown(second));
    }

    #[test]
    fn stl_page_sets_window_title() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        let mut view = viewport();
        browser.search("stl:vector", &mut view).unwrap();
        assert_eq!(view.window_title(), "vector<T, Alloc> - GMan");
    }

    #[test]
    fn unknown_stl_term_leaves_viewport_alone() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        let mut view = viewport();
        let outcome = browser.search("stl:hash_map", &mut view).unwrap();
        assert_eq!(
            outcome,
            Outcome::NotFound {
                term: "hash_map".to_string()
            }
        );
        assert_eq!(shown(view), "");
    }

    #[test]
    fn malformed_urls_are_ignored_silently() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        let mut view = viewport();
        assert_eq!(browser.search("man:printf", &mut view).unwrap(), Outcome::Ignored);
        assert_eq!(browser.search("stl:a b", &mut view).unwrap(), Outcome::Ignored);
        assert_eq!(browser.follow("man:(3)", &mut view).unwrap(), Outcome::Ignored);
        assert!(browser.man_pages().invoker().calls().is_empty());
        assert_eq!(shown(view), "");
    }

    #[test]
    fn index_is_built_lazily_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = plain_config().with_stl_root(dir.path().join("absent"));
        let mut browser = browser(config, FakeInvoker::silent());

        let outcome = browser.search("stl:vector", &mut viewport()).unwrap();
        assert!(matches!(outcome, Outcome::NotFound { .. }));
        assert!(matches!(browser.stl_index().status(), IndexStatus::Missing { .. }));

        // Installing the docs afterwards doesn't change an index already built.
        std::fs::create_dir(dir.path().join("absent")).unwrap();
        assert!(matches!(browser.stl_index().status(), IndexStatus::Missing { .. }));
    }

    #[test]
    fn injected_index_is_used() {
        let config = plain_config().with_stl_root("/nonexistent/gman/stl");
        let index = StlIndex::build(stl_root(), "stl_index.html");
        let mut browser = browser(config, FakeInvoker::silent()).with_stl_index(index);

        let outcome = browser.search("stl:std::vector", &mut viewport()).unwrap();
        assert_eq!(outcome, Outcome::Shown);
    }

    #[test]
    fn relative_link_is_concatenated_onto_current_url() {
        let fetcher = FakeFetcher::default().with_page("http://example.com/docs/../foo.html", "<p>foo</p>");
        let mut browser = Browser::new(plain_config(), FakeInvoker::silent(), fetcher)
            .with_navigation(Navigation::starting_at("http://example.com/docs/"));

        let mut view = viewport();
        let outcome = browser.follow("../foo.html", &mut view).unwrap();

        assert_eq!(
            browser.fetcher().requests(),
            ["http://example.com/docs/../foo.html"]
        );
        assert_eq!(
            outcome,
            Outcome::Streamed {
                url: "http://example.com/docs/../foo.html".to_string(),
                bytes: 10
            }
        );
        assert_eq!(
            browser.navigation().current(),
            Some("http://example.com/docs/../foo.html")
        );
        assert_eq!(shown(view), "<p>foo</p>");
    }

    #[test]
    fn fetched_page_sets_window_title() {
        let fetcher = FakeFetcher::default()
            .with_page("http://example.com/", "<html><head><title>Remote</title></head></html>");
        let mut browser = Browser::new(plain_config(), FakeInvoker::silent(), fetcher);

        let mut view = viewport();
        view.show_html("<title>printf(3)</title>").unwrap();
        browser.follow("http://example.com/", &mut view).unwrap();
        assert_eq!(view.window_title(), "Remote - GMan");
    }

    #[test]
    fn failed_fetch_keeps_navigation_where_it_was() {
        let mut browser = browser(plain_config(), FakeInvoker::silent())
            .with_navigation(Navigation::starting_at("http://example.com/docs/"));

        let result = browser.follow("http://down.example.com/", &mut viewport());
        assert!(result.is_err());
        assert_eq!(browser.fetcher().requests(), ["http://down.example.com/"]);
        assert_eq!(browser.navigation().current(), Some("http://example.com/docs/"));
    }

    #[test]
    fn absolute_link_replaces_current_url() {
        let fetcher = FakeFetcher::default()
            .with_page("http://example.com/a/index.html", "a")
            .with_page("http://example.com/a/index.htmlb.html", "b");
        let mut browser = Browser::new(plain_config(), FakeInvoker::silent(), fetcher);

        browser.follow("http://example.com/a/index.html", &mut viewport()).unwrap();
        browser.follow("b.html", &mut viewport()).unwrap();
        assert_eq!(
            browser.navigation().current(),
            Some("http://example.com/a/index.htmlb.html")
        );
    }

    #[test]
    fn file_link_shows_file_verbatim() {
        let path = stl_root().join("Vector.html");
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        let mut view = viewport();
        let link = format!("file://{}", path.display());

        assert_eq!(browser.follow(&link, &mut view).unwrap(), Outcome::Shown);
        assert_eq!(shown(view), std::fs::read_to_string(&path).unwrap());
        assert!(browser.navigation().current().is_none());
        assert!(browser.fetcher().requests().is_empty());
    }

    #[test]
    fn missing_file_link_is_an_error() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        let result = browser.follow("file:///nonexistent/gman/x.html", &mut viewport());
        assert!(matches!(result, Err(Error::Io { ref path, .. }) if path == Path::new("/nonexistent/gman/x.html")));
    }

    #[test]
    fn man_link_click_opens_man_page() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        browser.follow("man:fprintf(3)", &mut viewport()).unwrap();
        let calls = browser.man_pages().invoker().calls();
        assert_eq!(calls[0].args, ["-S", "3", "--", "fprintf"]);
    }

    #[test]
    fn status_hint_tracks_hovered_link() {
        let mut browser = browser(plain_config(), FakeInvoker::silent());
        browser.status_hint().hover(Some("man:write(2)"));
        assert_eq!(browser.status_hint().shown(), Some("man:write(2)"));
        browser.status_hint().hover(None);
        assert_eq!(browser.status_hint().shown(), None);
    }
}
