use crate::render::RenderedSymbol;

/// Identifies one generation of the output slot. Deferred work holds on to
/// a token instead of the symbol itself and gives up once it is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationToken(u64);

/// Single-owner output container of a page. It holds at most one rendered
/// symbol and every replacement hands out a fresh token.
#[derive(Debug, Default)]
pub struct SymbolSlot {
    current: Option<RenderedSymbol>,
    generation: u64,
}

impl SymbolSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn replace(&mut self, symbol: RenderedSymbol) -> GenerationToken {
        self.generation += 1;
        self.current = Some(symbol);
        GenerationToken(self.generation)
    }

    pub fn current(&self) -> Option<&RenderedSymbol> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut RenderedSymbol> {
        self.current.as_mut()
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.current.is_some() && token.0 == self.generation
    }

    /// The symbol `token` was issued for, unless it has since been
    /// replaced or cleared.
    pub fn get_mut(&mut self, token: GenerationToken) -> Option<&mut RenderedSymbol> {
        if self.is_current(token) {
            self.current.as_mut()
        } else {
            None
        }
    }
}
