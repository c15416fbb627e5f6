//! Standard-library recognition.
//!
//! This module is the single source of truth for mapping declarations to
//! logical standard-library symbols and symbols to the canonical header
//! that provides them. The concrete file a stdlib symbol was parsed from
//! never matters: `std::vector` is provided by `<vector>` regardless of
//! which libc++/libstdc++ file spelled it.
//!
//! Symbols with multiple legitimate providers (`size_t` and friends) map
//! to one canonical header here; preferring among physical candidates is
//! the ranker's job.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::ast::{Ast, DeclId};

/// A logical standard-library symbol, e.g. `std::vector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StdSymbol(u16);

/// A logical standard-library header, e.g. `<vector>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StdHeader(u16);

/// Canonical header spellings, with angle brackets.
const HEADERS: &[&str] = &[
    "<algorithm>",
    "<array>",
    "<atomic>",
    "<chrono>",
    "<cmath>",
    "<cstddef>",
    "<cstdint>",
    "<cstdio>",
    "<cstdlib>",
    "<cstring>",
    "<deque>",
    "<exception>",
    "<functional>",
    "<initializer_list>",
    "<iostream>",
    "<istream>",
    "<list>",
    "<map>",
    "<memory>",
    "<mutex>",
    "<optional>",
    "<ostream>",
    "<set>",
    "<span>",
    "<stdexcept>",
    "<string>",
    "<string_view>",
    "<thread>",
    "<tuple>",
    "<type_traits>",
    "<unordered_map>",
    "<unordered_set>",
    "<utility>",
    "<variant>",
    "<vector>",
];

/// Qualified symbol name and the index of its canonical header in
/// [`HEADERS`].
const SYMBOLS: &[(&str, &str)] = &[
    ("std::abs", "<cstdlib>"),
    ("std::array", "<array>"),
    ("std::atomic", "<atomic>"),
    ("std::cerr", "<iostream>"),
    ("std::cin", "<iostream>"),
    ("std::copy", "<algorithm>"),
    ("std::cout", "<iostream>"),
    ("std::deque", "<deque>"),
    ("std::endl", "<ostream>"),
    ("std::exception", "<exception>"),
    ("std::find", "<algorithm>"),
    ("std::forward", "<utility>"),
    ("std::free", "<cstdlib>"),
    ("std::function", "<functional>"),
    ("std::get", "<tuple>"),
    ("std::initializer_list", "<initializer_list>"),
    ("std::int32_t", "<cstdint>"),
    ("std::int64_t", "<cstdint>"),
    ("std::istream", "<istream>"),
    ("std::list", "<list>"),
    ("std::lock_guard", "<mutex>"),
    ("std::logic_error", "<stdexcept>"),
    ("std::make_shared", "<memory>"),
    ("std::make_unique", "<memory>"),
    ("std::malloc", "<cstdlib>"),
    ("std::map", "<map>"),
    ("std::max", "<algorithm>"),
    ("std::memcpy", "<cstring>"),
    ("std::min", "<algorithm>"),
    ("std::move", "<utility>"),
    ("std::multimap", "<map>"),
    ("std::multiset", "<set>"),
    ("std::mutex", "<mutex>"),
    ("std::nullptr_t", "<cstddef>"),
    ("std::optional", "<optional>"),
    ("std::ostream", "<ostream>"),
    ("std::pair", "<utility>"),
    ("std::printf", "<cstdio>"),
    ("std::ptrdiff_t", "<cstddef>"),
    ("std::runtime_error", "<stdexcept>"),
    ("std::set", "<set>"),
    ("std::shared_ptr", "<memory>"),
    ("std::size_t", "<cstddef>"),
    ("std::sort", "<algorithm>"),
    ("std::span", "<span>"),
    ("std::sqrt", "<cmath>"),
    ("std::string", "<string>"),
    ("std::string_view", "<string_view>"),
    ("std::swap", "<utility>"),
    ("std::thread", "<thread>"),
    ("std::tuple", "<tuple>"),
    ("std::uint32_t", "<cstdint>"),
    ("std::uint64_t", "<cstdint>"),
    ("std::unique_ptr", "<memory>"),
    ("std::unordered_map", "<unordered_map>"),
    ("std::unordered_set", "<unordered_set>"),
    ("std::variant", "<variant>"),
    ("std::vector", "<vector>"),
];

static HEADER_BY_NAME: LazyLock<FxHashMap<&'static str, StdHeader>> = LazyLock::new(|| {
    HEADERS
        .iter()
        .enumerate()
        .map(|(i, &name)| (name, StdHeader(i as u16)))
        .collect()
});

static SYMBOL_BY_NAME: LazyLock<FxHashMap<&'static str, StdSymbol>> = LazyLock::new(|| {
    SYMBOLS
        .iter()
        .enumerate()
        .map(|(i, &(name, _))| (name, StdSymbol(i as u16)))
        .collect()
});

impl StdSymbol {
    /// Look up a symbol by qualified name, e.g. `std::vector`.
    pub fn named(qualified: &str) -> Option<StdSymbol> {
        SYMBOL_BY_NAME.get(qualified).copied()
    }

    pub fn name(self) -> &'static str {
        SYMBOLS[self.0 as usize].0
    }

    /// The canonical header providing this symbol.
    pub fn header(self) -> StdHeader {
        HEADER_BY_NAME[SYMBOLS[self.0 as usize].1]
    }
}

impl StdHeader {
    /// Look up a header by spelling with angle brackets, e.g. `<vector>`.
    pub fn named(spelling: &str) -> Option<StdHeader> {
        HEADER_BY_NAME.get(spelling).copied()
    }

    /// The canonical spelling, with angle brackets.
    pub fn name(self) -> &'static str {
        HEADERS[self.0 as usize]
    }
}

/// Map a declaration to the standard-library symbol it declares, if any.
pub fn recognize(ast: &Ast, id: DeclId) -> Option<StdSymbol> {
    // Only namespace-qualified names can be stdlib symbols; a user's
    // top-level `vector` is not std::vector.
    ast.decl(id).scope.as_deref()?;
    StdSymbol::named(&ast.qualified_name(id))
}
