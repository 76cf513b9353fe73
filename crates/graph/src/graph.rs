use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::error::GraphError;

/// Untyped index of a cell inside a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// Typed handle to a cell holding a `T`.
///
/// Handles are `Copy` and can themselves be stored in cells, which is what
/// [`Graph::unwrap`] rebinds through.
pub struct Cell<T> {
    id: CellId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Cell<T> {
    fn new(id: CellId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cell<T> {}

impl<T> PartialEq for Cell<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Cell<T> {}

impl<T> std::hash::Hash for Cell<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({})", self.id)
    }
}

impl<T> From<Cell<T>> for CellId {
    fn from(cell: Cell<T>) -> Self {
        cell.id
    }
}

type ComputeFn = Box<dyn Fn(&Inputs<'_>) -> Result<Box<dyn Any>, GraphError>>;
type ResolveFn = fn(&dyn Any) -> Option<CellId>;

enum NodeKind {
    Mutable,
    Pure {
        inputs: Vec<CellId>,
        compute: ComputeFn,
    },
    /// Reads through the cell handle currently stored in `outer`.
    Unwrap {
        outer: CellId,
        resolve: ResolveFn,
        bound: Option<CellId>,
    },
}

struct Node {
    kind: NodeKind,
    value: Option<Box<dyn Any>>,
    dirty: bool,
    evaluating: bool,
    dependents: Vec<CellId>,
}

/// Counters for observing how much work the graph does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Successful recomputations of derived cells.
    pub recomputations: u64,
    /// Cells transitioned from clean to dirty.
    pub invalidations: u64,
}

/// Arena of cells with push-mark / pull-evaluate semantics.
///
/// Mutable cells are written from outside. Derived cells ("pure" and
/// "unwrap") hold a memoized value and a dirty flag. A write walks the
/// dependents depth-first and marks them dirty, stopping at cells that are
/// already dirty; a read of a dirty cell first brings its inputs up to date,
/// then recomputes.
///
/// A clean cell always has clean inputs, which is what makes stopping the
/// invalidation walk at dirty cells sound.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
    stats: GraphStats,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("cells", &self.nodes.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Read access to a derived cell's declared inputs during recomputation.
pub struct Inputs<'a> {
    graph: &'a Graph,
    declared: &'a [CellId],
}

impl<'a> Inputs<'a> {
    /// Borrow the current value of a declared input.
    pub fn get<T: 'static>(&self, cell: Cell<T>) -> Result<&'a T, GraphError> {
        if !self.declared.contains(&cell.id) {
            return Err(GraphError::UndeclaredInput(cell.id));
        }
        self.graph.value_ref(cell.id)
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells ever created.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    /// Create a mutable cell holding `initial`.
    pub fn mutable<T: 'static>(&mut self, initial: T) -> Cell<T> {
        let id = self.push(Node {
            kind: NodeKind::Mutable,
            value: Some(Box::new(initial)),
            dirty: false,
            evaluating: false,
            dependents: Vec::new(),
        });
        Cell::new(id)
    }

    /// Create a derived cell computed from `inputs`.
    ///
    /// The compute function may only read the declared inputs through
    /// [`Inputs::get`]. The cell starts dirty; nothing is computed until the
    /// first read.
    pub fn pure<T, F>(&mut self, inputs: &[CellId], compute: F) -> Result<Cell<T>, GraphError>
    where
        T: 'static,
        F: Fn(&Inputs<'_>) -> Result<T, GraphError> + 'static,
    {
        for input in inputs {
            self.node(*input)?;
        }
        let mut declared: Vec<CellId> = Vec::with_capacity(inputs.len());
        for input in inputs {
            if !declared.contains(input) {
                declared.push(*input);
            }
        }
        let id = self.push(Node {
            kind: NodeKind::Pure {
                inputs: declared.clone(),
                compute: Box::new(move |inputs: &Inputs<'_>| {
                    compute(inputs).map(|v| Box::new(v) as Box<dyn Any>)
                }),
            },
            value: None,
            dirty: true,
            evaluating: false,
            dependents: Vec::new(),
        });
        for input in declared {
            self.subscribe(input, id);
        }
        Ok(Cell::new(id))
    }

    /// Derived cell applying `f` to a single input.
    pub fn map<A, T, F>(&mut self, input: Cell<A>, f: F) -> Result<Cell<T>, GraphError>
    where
        A: 'static,
        T: 'static,
        F: Fn(&A) -> T + 'static,
    {
        self.pure(&[input.id], move |inputs| Ok(f(inputs.get(input)?)))
    }

    /// Derived cell combining two inputs.
    pub fn map2<A, B, T, F>(&mut self, a: Cell<A>, b: Cell<B>, f: F) -> Result<Cell<T>, GraphError>
    where
        A: 'static,
        B: 'static,
        T: 'static,
        F: Fn(&A, &B) -> T + 'static,
    {
        self.pure(&[a.id, b.id], move |inputs| {
            Ok(f(inputs.get(a)?, inputs.get(b)?))
        })
    }

    /// Cell whose value is the value of whichever cell `outer` currently
    /// holds.
    ///
    /// When `outer` is rewritten to hold a different handle, the unwrapped
    /// cell drops its subscription to the old inner cell and subscribes to
    /// the new one on its next read.
    pub fn unwrap<T: 'static>(&mut self, outer: Cell<Cell<T>>) -> Result<Cell<T>, GraphError> {
        self.node(outer.id)?;
        let id = self.push(Node {
            kind: NodeKind::Unwrap {
                outer: outer.id,
                resolve: resolve_handle::<T>,
                bound: None,
            },
            value: None,
            dirty: true,
            evaluating: false,
            dependents: Vec::new(),
        });
        self.subscribe(outer.id, id);
        Ok(Cell::new(id))
    }

    /// Replace the value of a mutable cell and invalidate its dependents.
    pub fn write<T: 'static>(&mut self, cell: Cell<T>, value: T) -> Result<(), GraphError> {
        let node = self.node_mut(cell.id)?;
        if !matches!(node.kind, NodeKind::Mutable) {
            return Err(GraphError::NotMutable(cell.id));
        }
        match node.value.as_mut().and_then(|v| v.downcast_mut::<T>()) {
            Some(slot) => *slot = value,
            None => return Err(GraphError::TypeMismatch(cell.id)),
        }
        self.invalidate_dependents(cell.id);
        Ok(())
    }

    /// Borrow the up-to-date value of any cell, recomputing if dirty.
    pub fn get<T: 'static>(&mut self, cell: Cell<T>) -> Result<&T, GraphError> {
        self.refresh(cell.id)?;
        self.value_ref(cell.id)
    }

    /// Clone the up-to-date value of any cell.
    pub fn read<T: Clone + 'static>(&mut self, cell: Cell<T>) -> Result<T, GraphError> {
        self.get(cell).cloned()
    }

    /// Whether the cell's memoized value is stale. Mutable cells are never dirty.
    pub fn is_dirty(&self, cell: impl Into<CellId>) -> bool {
        let id = cell.into();
        self.nodes.get(id.0).is_some_and(|n| n.dirty)
    }

    fn push(&mut self, node: Node) -> CellId {
        let id = CellId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn node(&self, id: CellId) -> Result<&Node, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownCell(id))
    }

    fn node_mut(&mut self, id: CellId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(id.0).ok_or(GraphError::UnknownCell(id))
    }

    fn subscribe(&mut self, upstream: CellId, dependent: CellId) {
        let deps = &mut self.nodes[upstream.0].dependents;
        if !deps.contains(&dependent) {
            deps.push(dependent);
        }
    }

    fn unsubscribe(&mut self, upstream: CellId, dependent: CellId) {
        let deps = &mut self.nodes[upstream.0].dependents;
        deps.retain(|d| *d != dependent);
    }

    fn invalidate_dependents(&mut self, source: CellId) {
        let mut stack: Vec<CellId> = self.nodes[source.0].dependents.clone();
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.0];
            if node.dirty {
                continue;
            }
            node.dirty = true;
            self.stats.invalidations += 1;
            stack.extend(node.dependents.iter().copied());
        }
    }

    /// Bring a cell up to date. On error the cell stays dirty.
    fn refresh(&mut self, id: CellId) -> Result<(), GraphError> {
        let node = self.node(id)?;
        if !node.dirty {
            return Ok(());
        }
        if node.evaluating {
            return Err(GraphError::Cycle(id));
        }

        self.nodes[id.0].evaluating = true;
        let result = self.evaluate(id);
        let node = &mut self.nodes[id.0];
        node.evaluating = false;

        match &result {
            Ok(()) => {
                node.dirty = false;
                self.stats.recomputations += 1;
                tracing::trace!(cell = %id, "recomputed");
            }
            Err(err) => {
                tracing::trace!(cell = %id, %err, "recompute failed, cell stays dirty");
            }
        }
        result
    }

    fn evaluate(&mut self, id: CellId) -> Result<(), GraphError> {
        match &self.nodes[id.0].kind {
            NodeKind::Mutable => Ok(()),
            NodeKind::Pure { inputs, .. } => {
                let inputs = inputs.clone();
                for input in inputs {
                    self.refresh(input)?;
                }
                let NodeKind::Pure { inputs, compute } = &self.nodes[id.0].kind else {
                    return Ok(());
                };
                let value = compute(&Inputs {
                    graph: self,
                    declared: inputs,
                })?;
                self.nodes[id.0].value = Some(value);
                Ok(())
            }
            NodeKind::Unwrap {
                outer,
                resolve,
                bound,
            } => {
                let (outer, resolve, previous) = (*outer, *resolve, *bound);
                self.refresh(outer)?;
                let inner = self
                    .value_any(outer)
                    .and_then(resolve)
                    .ok_or(GraphError::TypeMismatch(outer))?;
                self.node(inner)?;

                if previous != Some(inner) {
                    if let Some(old) = previous {
                        self.unsubscribe(old, id);
                    }
                    self.subscribe(inner, id);
                    if let NodeKind::Unwrap { bound, .. } = &mut self.nodes[id.0].kind {
                        *bound = Some(inner);
                    }
                    tracing::debug!(cell = %id, ?previous, to = %inner, "unwrap rebound");
                }
                self.refresh(inner)
            }
        }
    }

    /// Stored value of a cell, following unwrap bindings.
    fn value_any(&self, mut id: CellId) -> Option<&dyn Any> {
        loop {
            let node = self.nodes.get(id.0)?;
            match node.kind {
                NodeKind::Unwrap { bound, .. } => id = bound?,
                _ => return node.value.as_deref(),
            }
        }
    }

    fn value_ref<T: 'static>(&self, id: CellId) -> Result<&T, GraphError> {
        self.node(id)?;
        self.value_any(id)
            .ok_or(GraphError::Unevaluated(id))?
            .downcast_ref::<T>()
            .ok_or(GraphError::TypeMismatch(id))
    }
}

fn resolve_handle<T: 'static>(value: &dyn Any) -> Option<CellId> {
    value.downcast_ref::<Cell<T>>().map(|cell| cell.id)
}
