//! C# source modules.
//!
//! A C# module is either a single `.cs` file or a project directory whose `.cs` files are
//! found with [`FileScanner`]. Only type declarations matter for endpoint discovery, so the
//! loader does not build a full syntax tree: a lexer strips comments, literals and
//! preprocessor lines, and a declaration scanner follows namespaces and braces to find
//! `class` and `record` declarations with their modifiers and first base type.

use super::{ModuleLoader, TypeDeclaration, Visibility};
use crate::error::{LoadError, Result};
use crate::scanner::FileScanner;
use log::debug;
use std::fs;
use std::path::Path;

/// Modifiers that may precede a type declaration.
const TYPE_MODIFIERS: [&str; 13] = [
    "public",
    "private",
    "protected",
    "internal",
    "abstract",
    "sealed",
    "static",
    "partial",
    "new",
    "unsafe",
    "file",
    "readonly",
    "ref",
];

/// Words that can follow `class` without naming a type (generic constraints).
const NOT_TYPE_NAMES: [&str; 8] = [
    "where",
    "new",
    "class",
    "struct",
    "interface",
    "enum",
    "unmanaged",
    "notnull",
];

/// Loader for C# source files and project directories.
pub struct CSharpSourceLoader;

impl ModuleLoader for CSharpSourceLoader {
    fn format_name(&self) -> &'static str {
        "C# source"
    }

    fn supports(&self, path: &Path) -> bool {
        path.is_dir() || (path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("cs"))
    }

    fn load_declarations(&self, path: &Path) -> Result<Vec<TypeDeclaration>> {
        if path.is_file() {
            return load_file(path);
        }

        let scan_result = FileScanner::new(path.to_path_buf()).scan()?;
        debug!(
            "Found {} C# files in {}",
            scan_result.source_files.len(),
            path.display()
        );

        let mut declarations = Vec::new();
        for file in &scan_result.source_files {
            declarations.extend(load_file(file)?);
        }

        Ok(declarations)
    }
}

fn load_file(path: &Path) -> Result<Vec<TypeDeclaration>> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let declarations = parse_source(&content).map_err(|message| LoadError::parse(path, message))?;
    debug!(
        "Found {} type declarations in {}",
        declarations.len(),
        path.display()
    );

    Ok(declarations)
}

/// Extracts the class and record declarations of one C# compilation unit, in source order.
///
/// Returns a description of the problem when the source has unterminated comments or
/// literals, or unbalanced braces.
pub fn parse_source(source: &str) -> std::result::Result<Vec<TypeDeclaration>, String> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = DeclarationParser {
        tokens,
        pos: 0,
        declarations: Vec::new(),
    };

    match parser.parse_members("", None)? {
        BlockEnd::Eof => Ok(parser.declarations),
        BlockEnd::Brace => Err("unmatched `}`".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Punct(char),
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn tokenize(mut self) -> std::result::Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        let mut at_line_start = true;

        while let Some(c) = self.peek_at(0) {
            if c == '\n' {
                at_line_start = true;
                self.pos += 1;
                continue;
            }
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }
            if c == '#' && at_line_start {
                self.skip_line();
                continue;
            }
            at_line_start = false;

            if c == '/' && self.peek_at(1) == Some('/') {
                self.skip_line();
            } else if c == '/' && self.peek_at(1) == Some('*') {
                self.skip_block_comment()?;
            } else if let Some(prefix_len) = self.string_prefix_len() {
                self.skip_string(prefix_len)?;
            } else if c == '\'' {
                self.skip_char_literal()?;
            } else if c == '@' && self.peek_at(1).map_or(false, is_word_char) {
                // Verbatim identifier, e.g. `@class`
                self.pos += 1;
            } else if is_word_char(c) {
                let start = self.pos;
                while self.peek_at(0).map_or(false, is_word_char) {
                    self.pos += 1;
                }
                tokens.push(Token::Word(self.chars[start..self.pos].iter().collect()));
            } else {
                tokens.push(Token::Punct(c));
                self.pos += 1;
            }
        }

        Ok(tokens)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek_at(0) {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> std::result::Result<(), String> {
        self.pos += 2;
        loop {
            match (self.peek_at(0), self.peek_at(1)) {
                (Some('*'), Some('/')) => {
                    self.pos += 2;
                    return Ok(());
                }
                (Some(_), _) => self.pos += 1,
                (None, _) => return Err("unterminated block comment".to_string()),
            }
        }
    }

    /// Length of the `$`/`@` prefix when a string literal starts here.
    fn string_prefix_len(&self) -> Option<usize> {
        let mut len = 0;
        while len < 4 && matches!(self.peek_at(len), Some('$') | Some('@')) {
            len += 1;
        }
        (self.peek_at(len) == Some('"')).then_some(len)
    }

    fn quote_run(&self) -> usize {
        let mut run = 0;
        while self.peek_at(run) == Some('"') {
            run += 1;
        }
        run
    }

    fn skip_string(&mut self, prefix_len: usize) -> std::result::Result<(), String> {
        let prefix = &self.chars[self.pos..self.pos + prefix_len];
        let verbatim = prefix.contains(&'@');
        let interpolated = prefix.contains(&'$');
        self.pos += prefix_len;

        let quotes = self.quote_run();
        if !verbatim && quotes >= 3 {
            return self.skip_raw_string(quotes);
        }
        if !verbatim && quotes == 2 {
            self.pos += 2;
            return Ok(());
        }

        self.pos += 1;
        loop {
            match self.peek_at(0) {
                None => return Err("unterminated string literal".to_string()),
                Some('"') if verbatim && self.peek_at(1) == Some('"') => self.pos += 2,
                Some('"') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some('\\') if !verbatim => self.pos += 2,
                Some('{') | Some('}') if interpolated && self.peek_at(1) == self.peek_at(0) => {
                    self.pos += 2
                }
                Some('{') if interpolated => self.skip_interpolation_hole()?,
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_raw_string(&mut self, quotes: usize) -> std::result::Result<(), String> {
        self.pos += quotes;
        loop {
            match self.peek_at(0) {
                None => return Err("unterminated raw string literal".to_string()),
                Some('"') => {
                    let run = self.quote_run();
                    self.pos += run;
                    if run >= quotes {
                        return Ok(());
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_interpolation_hole(&mut self) -> std::result::Result<(), String> {
        self.pos += 1;
        let mut depth = 1;
        while depth > 0 {
            match self.peek_at(0) {
                None => return Err("unterminated interpolated string".to_string()),
                Some('{') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some('}') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some('\'') => self.skip_char_literal()?,
                Some(_) => match self.string_prefix_len() {
                    Some(prefix_len) => self.skip_string(prefix_len)?,
                    None => self.pos += 1,
                },
            }
        }
        Ok(())
    }

    fn skip_char_literal(&mut self) -> std::result::Result<(), String> {
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                None => return Err("unterminated character literal".to_string()),
                Some('\\') => self.pos += 2,
                Some('\'') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}

/// How a member list ended.
#[derive(Debug, PartialEq, Eq)]
enum BlockEnd {
    Eof,
    Brace,
}

/// Declarations whose bodies are scanned for nested types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    /// Classes and record classes, reported as declarations
    Class,
    /// Structs, record structs and interfaces; they cannot derive from a class
    Container,
}

/// The type whose body is being scanned.
struct Enclosing {
    full_name: String,
    exported: bool,
}

struct DeclarationParser {
    tokens: Vec<Token>,
    pos: usize,
    declarations: Vec<TypeDeclaration>,
}

impl DeclarationParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_is_punct(&self, c: char) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == c)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Word(word)) => Some(word.as_str()),
            _ => None,
        }
    }

    /// Scans members until the closing brace of the current block or the end of input.
    fn parse_members(
        &mut self,
        namespace: &str,
        enclosing: Option<&Enclosing>,
    ) -> std::result::Result<BlockEnd, String> {
        let mut namespace = namespace.to_string();
        let mut modifiers: Vec<String> = Vec::new();

        while let Some(token) = self.next() {
            match token {
                Token::Punct('}') => return Ok(BlockEnd::Brace),
                Token::Punct('{') => {
                    self.skip_group('{', '}')?;
                    modifiers.clear();
                }
                Token::Punct('(') => {
                    self.skip_group('(', ')')?;
                    modifiers.clear();
                }
                // Attribute sections sit between modifiers and are not part of them
                Token::Punct('[') => self.skip_group('[', ']')?,
                Token::Punct(_) => modifiers.clear(),
                Token::Word(word) => match word.as_str() {
                    "namespace" => {
                        let name = self.qualified_name();
                        let nested = join_namespace(&namespace, &name);
                        match self.next() {
                            Some(Token::Punct(';')) => namespace = nested,
                            Some(Token::Punct('{')) => self.expect_block(&nested, None)?,
                            _ => return Err(format!("malformed namespace declaration `{}`", name)),
                        }
                        modifiers.clear();
                    }
                    "class" => {
                        self.parse_type(TypeKind::Class, &namespace, enclosing, &modifiers)?;
                        modifiers.clear();
                    }
                    "struct" | "interface" => {
                        self.parse_type(TypeKind::Container, &namespace, enclosing, &modifiers)?;
                        modifiers.clear();
                    }
                    "record" => {
                        let kind = match self.peek_word() {
                            Some("struct") => {
                                self.pos += 1;
                                TypeKind::Container
                            }
                            Some("class") => {
                                self.pos += 1;
                                TypeKind::Class
                            }
                            _ => TypeKind::Class,
                        };
                        self.parse_type(kind, &namespace, enclosing, &modifiers)?;
                        modifiers.clear();
                    }
                    w if TYPE_MODIFIERS.contains(&w) => modifiers.push(w.to_string()),
                    _ => modifiers.clear(),
                },
            }
        }

        Ok(BlockEnd::Eof)
    }

    fn expect_block(
        &mut self,
        namespace: &str,
        enclosing: Option<&Enclosing>,
    ) -> std::result::Result<(), String> {
        match self.parse_members(namespace, enclosing)? {
            BlockEnd::Brace => Ok(()),
            BlockEnd::Eof => Err("unexpected end of file, missing `}`".to_string()),
        }
    }

    /// Skips tokens up to and including the `close` that balances an already consumed `open`.
    fn skip_group(&mut self, open: char, close: char) -> std::result::Result<(), String> {
        let mut depth = 1;
        while depth > 0 {
            match self.next() {
                Some(Token::Punct(c)) if c == open => depth += 1,
                Some(Token::Punct(c)) if c == close => depth -= 1,
                Some(_) => {}
                None => return Err(format!("unexpected end of file, missing `{}`", close)),
            }
        }
        Ok(())
    }

    fn qualified_name(&mut self) -> String {
        let mut name = String::new();
        loop {
            match self.peek() {
                Some(Token::Word(word)) => name.push_str(word),
                Some(Token::Punct('.')) => name.push('.'),
                _ => break,
            }
            self.pos += 1;
        }
        name
    }

    /// Parses a type declaration after its keyword.
    fn parse_type(
        &mut self,
        kind: TypeKind,
        namespace: &str,
        enclosing: Option<&Enclosing>,
        modifiers: &[String],
    ) -> std::result::Result<(), String> {
        let ident = match self.peek_word() {
            Some(word) if !NOT_TYPE_NAMES.contains(&word) => word.to_string(),
            // `where T : class` and friends
            _ => return Ok(()),
        };
        self.pos += 1;

        let arity = if self.peek_is_punct('<') {
            self.pos += 1;
            self.generic_arity()?
        } else {
            0
        };

        // Primary constructor parameters
        if self.peek_is_punct('(') {
            self.pos += 1;
            self.skip_group('(', ')')?;
        }

        let base = if self.peek_is_punct(':') {
            self.pos += 1;
            self.first_base_type()?
        } else {
            None
        };

        // Remaining base types and constraint clauses
        loop {
            match self.peek() {
                Some(Token::Punct('{')) | Some(Token::Punct(';')) => break,
                Some(Token::Punct('(')) => {
                    self.pos += 1;
                    self.skip_group('(', ')')?;
                }
                Some(_) => self.pos += 1,
                None => {
                    return Err(format!(
                        "unexpected end of file in declaration of `{}`",
                        ident
                    ))
                }
            }
        }

        let name = if arity > 0 {
            format!("{}`{}", ident, arity)
        } else {
            ident
        };
        let full_name = match enclosing {
            Some(outer) => format!("{}+{}", outer.full_name, name),
            None => join_namespace(namespace, &name),
        };
        let visibility = match enclosing {
            Some(outer) if !outer.exported => Visibility::Private,
            _ => declared_visibility(modifiers, enclosing.is_some()),
        };
        let has = |modifier: &str| modifiers.iter().any(|m| m == modifier);

        if kind == TypeKind::Class {
            self.declarations.push(TypeDeclaration {
                name,
                full_name: full_name.clone(),
                base,
                explicit_chain: None,
                is_abstract: has("abstract") || has("static"),
                visibility,
                is_generated: false,
            });
        }

        if let Some(Token::Punct('{')) = self.next() {
            let this = Enclosing {
                full_name,
                exported: visibility == Visibility::Public,
            };
            self.expect_block(namespace, Some(&this))?;
        }

        Ok(())
    }

    /// Counts type parameters up to the `>` that closes an already consumed `<`.
    fn generic_arity(&mut self) -> std::result::Result<usize, String> {
        let mut depth = 1;
        let mut commas = 0;
        while depth > 0 {
            match self.next() {
                Some(Token::Punct('<')) => depth += 1,
                Some(Token::Punct('>')) => depth -= 1,
                Some(Token::Punct(',')) if depth == 1 => commas += 1,
                Some(_) => {}
                None => return Err("unexpected end of file in type parameter list".to_string()),
            }
        }
        Ok(commas + 1)
    }

    fn first_base_type(&mut self) -> std::result::Result<Option<String>, String> {
        let mut tokens = Vec::new();
        let mut depth = 0;

        loop {
            match self.peek() {
                None => break,
                Some(Token::Punct('{')) | Some(Token::Punct(';')) => break,
                Some(Token::Punct(',')) if depth == 0 => break,
                Some(Token::Word(word)) if depth == 0 && word == "where" => break,
                Some(Token::Punct('(')) if depth == 0 => {
                    // Arguments passed to the base primary constructor
                    self.pos += 1;
                    self.skip_group('(', ')')?;
                    continue;
                }
                Some(token) => {
                    match token {
                        Token::Punct('<') => depth += 1,
                        Token::Punct('>') => depth -= 1,
                        _ => {}
                    }
                    tokens.push(token.clone());
                }
            }
            self.pos += 1;
        }

        let reference = normalize_type_reference(&tokens);
        Ok((!reference.is_empty()).then_some(reference))
    }
}

fn declared_visibility(modifiers: &[String], nested: bool) -> Visibility {
    let has = |modifier: &str| modifiers.iter().any(|m| m == modifier);

    if has("public") {
        Visibility::Public
    } else if has("private") || (has("protected") && !has("internal")) {
        Visibility::Private
    } else if has("internal") || has("file") {
        Visibility::Internal
    } else if nested {
        Visibility::Private
    } else {
        Visibility::Internal
    }
}

fn join_namespace(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Renders a base type reference the way metadata names it: `global::` and alias qualifiers
/// are dropped, and generic arguments become an arity suffix (`Base<T, U>` → ``Base`2``).
fn normalize_type_reference(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Word(word) => out.push_str(word),
            Token::Punct('.') => out.push('.'),
            Token::Punct(':') => out.clear(),
            Token::Punct('<') => {
                let mut depth = 1;
                let mut commas = 0;
                i += 1;
                while i < tokens.len() && depth > 0 {
                    match &tokens[i] {
                        Token::Punct('<') => depth += 1,
                        Token::Punct('>') => depth -= 1,
                        Token::Punct(',') if depth == 1 => commas += 1,
                        _ => {}
                    }
                    i += 1;
                }
                out.push_str(&format!("`{}", commas + 1));
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(source: &str) -> Vec<TypeDeclaration> {
        parse_source(source).unwrap()
    }

    fn full_names(decls: &[TypeDeclaration]) -> Vec<&str> {
        decls.iter().map(|d| d.full_name.as_str()).collect()
    }

    #[test]
    fn test_parse_block_namespace_controller() {
        let decls = parse(
            r#"
            using System.Web.Http;

            namespace Shop.Api.Controllers
            {
                public class OrdersController : ApiController
                {
                    public IHttpActionResult Get(int id) { return Ok(id); }
                }
            }
            "#,
        );

        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "OrdersController");
        assert_eq!(decls[0].full_name, "Shop.Api.Controllers.OrdersController");
        assert_eq!(decls[0].base.as_deref(), Some("ApiController"));
        assert_eq!(decls[0].visibility, Visibility::Public);
        assert!(!decls[0].is_abstract);
    }

    #[test]
    fn test_parse_file_scoped_namespace() {
        let decls = parse(
            r#"
            namespace Shop.Api;

            public abstract class BaseController : ApiController { }
            public static class Routes { }
            "#,
        );

        assert_eq!(full_names(&decls), vec!["Shop.Api.BaseController", "Shop.Api.Routes"]);
        assert!(decls[0].is_abstract);
        assert!(decls[1].is_abstract);
    }

    #[test]
    fn test_parse_nested_namespaces() {
        let decls = parse(
            r#"
            namespace Shop { namespace Api { public class A {} } public class B {} }
            public class C {}
            "#,
        );

        assert_eq!(full_names(&decls), vec!["Shop.Api.A", "Shop.B", "C"]);
    }

    #[test]
    fn test_default_visibility_is_internal() {
        let decls = parse("class Hidden {} internal class AlsoHidden {} public sealed partial class Shown {}");

        assert_eq!(decls[0].visibility, Visibility::Internal);
        assert_eq!(decls[1].visibility, Visibility::Internal);
        assert_eq!(decls[2].visibility, Visibility::Public);
    }

    #[test]
    fn test_nested_types() {
        let decls = parse(
            r#"
            namespace Shop {
                public class Outer {
                    public class InnerController : ApiController {}
                    class Hidden {}
                    private class Secret { public class Deep {} }
                }
                internal class Container { public class Exposed {} }
            }
            "#,
        );

        assert_eq!(
            full_names(&decls),
            vec![
                "Shop.Outer",
                "Shop.Outer+InnerController",
                "Shop.Outer+Hidden",
                "Shop.Outer+Secret",
                "Shop.Outer+Secret+Deep",
                "Shop.Container",
                "Shop.Container+Exposed",
            ]
        );
        assert_eq!(decls[1].name, "InnerController");
        assert_eq!(decls[1].visibility, Visibility::Public);
        assert_eq!(decls[2].visibility, Visibility::Private);
        assert_eq!(decls[4].visibility, Visibility::Private);
        assert_eq!(decls[6].visibility, Visibility::Private);
    }

    #[test]
    fn test_generic_arity_and_generic_base() {
        let decls = parse(
            r#"
            public abstract class CrudController<TEntity, TKey> : global::System.Web.Http.ApiController
                where TEntity : class, new()
            { }
            public class UsersController : CrudController<User, Dictionary<string, int>> { }
            "#,
        );

        assert_eq!(decls[0].name, "CrudController`2");
        assert_eq!(decls[0].base.as_deref(), Some("System.Web.Http.ApiController"));
        assert_eq!(decls[1].base.as_deref(), Some("CrudController`2"));
    }

    #[test]
    fn test_first_base_only() {
        let decls = parse("public class A : Base, IDisposable, IComparable<A> {}");

        assert_eq!(decls[0].base.as_deref(), Some("Base"));
    }

    #[test]
    fn test_records_and_primary_constructors() {
        let decls = parse(
            r#"
            public record Order(int Id);
            public record class Invoice(int Id) : Document(Id);
            public record struct Point(int X, int Y);
            public class ReportsController(IService service) : ApiController { }
            "#,
        );

        assert_eq!(
            full_names(&decls),
            vec!["Order", "Invoice", "ReportsController"]
        );
        assert_eq!(decls[1].base.as_deref(), Some("Document"));
        assert_eq!(decls[2].base.as_deref(), Some("ApiController"));
    }

    #[test]
    fn test_ignores_comments_strings_and_attributes() {
        let decls = parse(
            r#"
            // public class CommentedController : ApiController {}
            /* public class BlockCommented : ApiController { */
            #if DEBUG
            #endif
            namespace Shop
            {
                [RoutePrefix("api/orders")]
                [Authorize(Roles = "Admin")]
                public class OrdersController : ApiController
                {
                    private const string Text = "} class Fake : ApiController {";
                    private const string Path = @"C:\temp\""quoted""";
                    private const string Raw = """
                        class AlsoFake { }
                        """;
                    private readonly char brace = '{';
                    public string Describe(int id) => $"Order {id} {{literal}} {(id > 0 ? "}" : "{")}";
                }
            }
            "#,
        );

        assert_eq!(full_names(&decls), vec!["Shop.OrdersController"]);
    }

    #[test]
    fn test_generic_constraints_are_not_declarations() {
        let decls = parse(
            r#"
            public class Repository
            {
                public T Find<T>(int id) where T : class { return null; }
                public abstract void Save<T>(T item) where T : class;
            }
            "#,
        );

        assert_eq!(full_names(&decls), vec!["Repository"]);
    }

    #[test]
    fn test_interfaces_structs_and_enums_are_skipped() {
        let decls = parse(
            r#"
            public interface IOrdersController { }
            public struct Money { }
            public enum Status { Open, Closed }
            public delegate void Handler(object sender);
            public class Real { }
            "#,
        );

        assert_eq!(full_names(&decls), vec!["Real"]);
    }

    #[test]
    fn test_classes_nested_in_structs_and_interfaces() {
        let decls = parse(
            r#"
            namespace Shop
            {
                public struct Api
                {
                    public class PingController : ApiController { }
                }

                public readonly record struct Version(int Major)
                {
                    public class VersionController : ApiController { }
                }

                public interface IEndpoints
                {
                    void Map<T>() where T : struct;
                    public class HealthController : ApiController { }
                }

                struct Hidden
                {
                    public class SecretController : ApiController { }
                }
            }
            "#,
        );

        assert_eq!(
            full_names(&decls),
            vec![
                "Shop.Api+PingController",
                "Shop.Version+VersionController",
                "Shop.IEndpoints+HealthController",
                "Shop.Hidden+SecretController",
            ]
        );
        assert_eq!(decls[0].base.as_deref(), Some("ApiController"));
        assert_eq!(decls[0].visibility, Visibility::Public);
        assert_eq!(decls[3].visibility, Visibility::Private);
    }

    #[test]
    fn test_top_level_statements() {
        let decls = parse(
            r#"
            var builder = WebApplication.CreateBuilder(args);
            var app = builder.Build();
            app.MapGet("/", () => { return "class Nope {}"; });
            app.Run();

            public partial class Program { }
            "#,
        );

        assert_eq!(full_names(&decls), vec!["Program"]);
    }

    #[test]
    fn test_unbalanced_braces_are_errors() {
        assert!(parse_source("namespace Shop { public class A {").is_err());
        assert!(parse_source("public class A { } }").is_err());
    }

    #[test]
    fn test_unterminated_literals_are_errors() {
        assert!(parse_source("/* never closed").is_err());
        assert!(parse_source("var s = \"never closed;").is_err());
    }

    #[test]
    fn test_normalize_type_reference() {
        let tokens = Lexer::new("global::Shop.Base<Dictionary<string, int>, T>?")
            .tokenize()
            .unwrap();

        assert_eq!(normalize_type_reference(&tokens), "Shop.Base`2");
    }

    #[test]
    fn test_loader_reads_project_directory_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("Controllers")).unwrap();
        fs::create_dir(root.join("obj")).unwrap();
        fs::write(
            root.join("Controllers/UsersController.cs"),
            "namespace Shop; public class UsersController : ApiController {}",
        )
        .unwrap();
        fs::write(
            root.join("Controllers/OrdersController.cs"),
            "namespace Shop; public class OrdersController : ApiController {}",
        )
        .unwrap();
        fs::write(root.join("obj/Generated.cs"), "public class Generated {}").unwrap();

        let loader = CSharpSourceLoader;
        assert!(loader.supports(root));

        let decls = loader.load_declarations(root).unwrap();

        assert_eq!(
            full_names(&decls),
            vec!["Shop.OrdersController", "Shop.UsersController"]
        );
    }

    #[test]
    fn test_loader_reports_parse_error_with_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Broken.cs");
        fs::write(&file, "public class Broken {").unwrap();

        let err = CSharpSourceLoader.load_declarations(&file).unwrap_err();

        assert!(matches!(err, LoadError::Parse { ref path, .. } if *path == file));
    }
}
