//! Integration tests for graph evaluation and Jacobian composition.
//!
//! Gradients are checked against the first-order law
//!
//! f(x + δ) - f(x) ≈ Σ_v contract(δ_v, ∂f/∂v, rank(v))
//!
//! with small random perturbations δ.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use approx::assert_relative_eq;
use paragraph::operations::{add, zip_with};
use paragraph::{
    Derivative, Graph, GraphBuilder, Node, Result, SharedTensor, Tensor, TensorFunction,
    Variable, contract, functions,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const STEP: f64 = 1e-6;

/// Largest deviation from the first-order law at `inputs`, and the
/// tolerance it should stay within.
fn first_order_deviation(
    graph: &Graph,
    output: Node,
    moving: &[Variable],
    inputs: &[Option<SharedTensor>],
    rng: &mut StdRng,
) -> (f64, f64) {
    let derivative = graph.partial_gradient(output, moving, inputs).unwrap();

    let mut shifted = inputs.to_vec();
    let mut predicted = Tensor::zeros(derivative.value.shape());
    for (variable, jacobian) in moving.iter().zip(&derivative.jacobians) {
        let x = inputs[variable.index()].as_ref().unwrap();
        let delta = Tensor::random_scaled_with_rng(x.shape(), STEP, rng);
        shifted[variable.index()] = Some(add(x, &delta).unwrap().into_shared());
        let change = contract(&delta, jacobian, x.ndim()).unwrap();
        predicted = add(&predicted, &change).unwrap();
    }

    let actual = zip_with(
        &graph.value(output, &shifted).unwrap(),
        &derivative.value,
        "difference",
        |a, b| a - b,
    )
    .unwrap();

    let deviation = actual
        .data()
        .iter()
        .zip(predicted.data())
        .map(|(a, p)| (a - p).abs())
        .fold(0.0, f64::max);
    let tolerance = STEP * STEP * 100.0 * moving.len().max(1) as f64;
    (deviation, tolerance)
}

fn shared(data: Vec<f64>, shape: &[usize]) -> SharedTensor {
    Tensor::from_vec(data, shape).unwrap().into_shared()
}

/// y = w · x + b, contracting one axis.
fn affine(builder: &mut GraphBuilder) -> (Variable, Variable, Variable, Node) {
    let w = builder.add_variable("w");
    let x = builder.add_variable("x");
    let b = builder.add_variable("b");
    let wx = builder
        .add_operation(
            "wx",
            functions::chain_multiplication(1),
            &[w.into(), x.into()],
        )
        .unwrap();
    let y = builder
        .add_operation("y", functions::add(), &[wx.into(), b.into()])
        .unwrap();
    (w, x, b, y.into())
}

#[test]
fn test_scalar_affine_exact() {
    let mut builder = GraphBuilder::new();
    let w = builder.add_variable("w");
    let x = builder.add_variable("x");
    let b = builder.add_variable("b");
    let wx = builder
        .add_operation(
            "wx",
            functions::chain_multiplication(0),
            &[w.into(), x.into()],
        )
        .unwrap();
    let y = builder
        .add_operation("y", functions::add(), &[wx.into(), b.into()])
        .unwrap();
    let graph = builder.build_graph();

    let (wv, xv, bv) = (0.7, -1.3, 0.25);
    let inputs = graph
        .create_variable_values([
            (w, Tensor::scalar(wv).into_shared()),
            (x, Tensor::scalar(xv).into_shared()),
            (b, Tensor::scalar(bv).into_shared()),
        ])
        .unwrap();

    let value = graph.value(y, &inputs).unwrap();
    assert_relative_eq!(value.data()[0], wv * xv + bv, epsilon = 1e-15);

    let derivative = graph.partial_gradient(y, &[w, x, b], &inputs).unwrap();
    assert_relative_eq!(derivative.value.data()[0], wv * xv + bv, epsilon = 1e-15);
    assert_relative_eq!(derivative.jacobians[0].data()[0], xv, epsilon = 1e-15);
    assert_relative_eq!(derivative.jacobians[1].data()[0], wv, epsilon = 1e-15);
    assert_relative_eq!(derivative.jacobians[2].data()[0], 1.0, epsilon = 1e-15);
    for jacobian in &derivative.jacobians {
        assert_eq!(jacobian.ndim(), 0);
    }
}

#[test]
fn test_tensor_affine_first_order() {
    let mut builder = GraphBuilder::new();
    let (w, x, b, y) = affine(&mut builder);
    let graph = builder.build_graph();

    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..5 {
        let inputs = graph
            .create_variable_values([
                (w, Tensor::random_with_rng(&[2, 3, 5], &mut rng).into_shared()),
                (x, Tensor::random_with_rng(&[5, 7], &mut rng).into_shared()),
                (b, Tensor::random_with_rng(&[2, 3, 7], &mut rng).into_shared()),
            ])
            .unwrap();

        let derivative = graph.partial_gradient(y, &[w, x, b], &inputs).unwrap();
        assert_eq!(derivative.value.shape(), &[2, 3, 7]);
        assert_eq!(derivative.jacobians[0].shape(), &[2, 3, 5, 2, 3, 7]);
        assert_eq!(derivative.jacobians[1].shape(), &[5, 7, 2, 3, 7]);
        assert_eq!(derivative.jacobians[2].shape(), &[2, 3, 7, 2, 3, 7]);

        for moving in [vec![w, x, b], vec![w], vec![x, b]] {
            let (deviation, tolerance) =
                first_order_deviation(&graph, y, &moving, &inputs, &mut rng);
            assert!(
                deviation <= tolerance,
                "deviation {deviation} exceeds {tolerance} for {moving:?}"
            );
        }
    }
}

#[test]
fn test_value_matches_partial_gradient_value() {
    let mut builder = GraphBuilder::new();
    let (w, x, b, y) = affine(&mut builder);
    let graph = builder.build_graph();

    let mut rng = StdRng::seed_from_u64(5);
    let inputs = graph
        .create_variable_values([
            (w, Tensor::random_with_rng(&[4, 3], &mut rng).into_shared()),
            (x, Tensor::random_with_rng(&[3], &mut rng).into_shared()),
            (b, Tensor::random_with_rng(&[4], &mut rng).into_shared()),
        ])
        .unwrap();

    let value = graph.value(y, &inputs).unwrap();
    let derivative = graph.partial_gradient(y, &[x], &inputs).unwrap();
    assert_eq!(*value, *derivative.value);
}

/// Delegates to an inner function and counts calls.
#[derive(Debug)]
struct Counting {
    inner: paragraph::SharedFunction,
    values: AtomicUsize,
    gradients: AtomicUsize,
}

impl Counting {
    fn new(inner: paragraph::SharedFunction) -> Arc<Self> {
        Arc::new(Self {
            inner,
            values: AtomicUsize::new(0),
            gradients: AtomicUsize::new(0),
        })
    }
}

impl TensorFunction for Counting {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        self.values.fetch_add(1, Ordering::SeqCst);
        self.inner.value(inputs)
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        self.gradients.fetch_add(1, Ordering::SeqCst);
        self.inner.gradient(inputs)
    }
}

#[test]
fn test_unreached_operation_skips_gradient() {
    // out = negative(y) + negative(x); only the second branch depends on x.
    let untouched = Counting::new(functions::negative());
    let touched = Counting::new(functions::negative());

    let mut builder = GraphBuilder::new();
    let x = builder.add_variable("x");
    let y = builder.add_variable("y");
    let ny = builder
        .add_operation("ny", untouched.clone(), &[y.into()])
        .unwrap();
    let nx = builder
        .add_operation("nx", touched.clone(), &[x.into()])
        .unwrap();
    let out = builder
        .add_operation("out", functions::add(), &[ny.into(), nx.into()])
        .unwrap();
    let graph = builder.build_graph();

    let inputs = graph
        .create_variable_values([
            (x, shared(vec![1.0, 2.0], &[2])),
            (y, shared(vec![3.0, 4.0], &[2])),
        ])
        .unwrap();

    let derivative = graph.partial_gradient(out, &[x], &inputs).unwrap();
    assert_eq!(derivative.value.data(), &[-4.0, -6.0]);
    assert_eq!(derivative.jacobians[0].data(), &[-1.0, 0.0, 0.0, -1.0]);
    assert_eq!(untouched.gradients.load(Ordering::SeqCst), 0);
    assert_eq!(untouched.values.load(Ordering::SeqCst), 1);
    assert_eq!(touched.gradients.load(Ordering::SeqCst), 1);

    // An output no moving variable reaches gets an exact zero Jacobian.
    let derivative = graph.partial_gradient(ny, &[x], &inputs).unwrap();
    assert_eq!(derivative.jacobians[0].shape(), &[2, 2]);
    assert!(derivative.jacobians[0].data().iter().all(|&v| v == 0.0));
    assert_eq!(untouched.gradients.load(Ordering::SeqCst), 0);
}

#[test]
fn test_only_dependencies_are_evaluated() {
    let used = Counting::new(functions::negative());
    let unused = Counting::new(functions::negative());

    let mut builder = GraphBuilder::new();
    let x = builder.add_variable("x");
    let a = builder.add_operation("a", used.clone(), &[x.into()]).unwrap();
    builder
        .add_operation("b", unused.clone(), &[x.into()])
        .unwrap();
    let graph = builder.build_graph();

    let inputs = graph
        .create_variable_values([(x, Tensor::scalar(1.0).into_shared())])
        .unwrap();
    graph.value(a, &inputs).unwrap();
    graph.partial_gradient(a, &[x], &inputs).unwrap();

    assert_eq!(used.values.load(Ordering::SeqCst), 1);
    assert_eq!(used.gradients.load(Ordering::SeqCst), 1);
    assert_eq!(unused.values.load(Ordering::SeqCst), 0);
    assert_eq!(unused.gradients.load(Ordering::SeqCst), 0);
}

/// Delegates to an inner function and keeps a weak handle on every tensor
/// it hands to the graph.
#[derive(Debug)]
struct Tracking {
    inner: paragraph::SharedFunction,
    produced: Mutex<Vec<Weak<Tensor>>>,
}

impl Tracking {
    fn new(inner: paragraph::SharedFunction) -> Arc<Self> {
        Arc::new(Self {
            inner,
            produced: Mutex::new(Vec::new()),
        })
    }

    fn track(&self, tensor: &SharedTensor) {
        self.produced.lock().unwrap().push(Arc::downgrade(tensor));
    }

    fn alive(&self) -> usize {
        self.produced
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.upgrade().is_some())
            .count()
    }
}

impl TensorFunction for Tracking {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        let value = self.inner.value(inputs)?;
        self.track(&value);
        Ok(value)
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        let derivative = self.inner.gradient(inputs)?;
        self.track(&derivative.value);
        for jacobian in &derivative.jacobians {
            self.track(jacobian);
        }
        Ok(derivative)
    }
}

#[test]
fn test_intermediates_released_after_call() {
    let tracking = Tracking::new(functions::sigmoid());

    let mut builder = GraphBuilder::new();
    let x = builder.add_variable("x");
    let mut last: Node = x.into();
    for i in 0..6 {
        last = builder
            .add_operation(format!("s{i}"), tracking.clone(), &[last])
            .unwrap()
            .into();
    }
    let graph = builder.build_graph();
    let inputs = graph
        .create_variable_values([(x, shared(vec![0.1, 0.2, 0.3], &[3]))])
        .unwrap();

    let value = graph.value(last, &inputs).unwrap();
    assert_eq!(Arc::strong_count(&value), 1);
    assert_eq!(tracking.alive(), 1);
    drop(value);
    assert_eq!(tracking.alive(), 0);

    let derivative = graph.partial_gradient(last, &[x], &inputs).unwrap();
    assert_eq!(Arc::strong_count(&derivative.value), 1);
    assert_eq!(Arc::strong_count(&derivative.jacobians[0]), 1);
    drop(derivative);
    assert_eq!(tracking.alive(), 0);

    // Inputs are only borrowed.
    assert_eq!(Arc::strong_count(inputs[0].as_ref().unwrap()), 1);
}

/// Records, on every call, how many tensors it produced earlier are still
/// alive. The graph's own slots are the only other holders.
#[derive(Debug)]
struct PeakTracking {
    inner: paragraph::SharedFunction,
    produced: Mutex<Vec<Weak<Tensor>>>,
    peak: AtomicUsize,
}

impl PeakTracking {
    fn new(inner: paragraph::SharedFunction) -> Arc<Self> {
        Arc::new(Self {
            inner,
            produced: Mutex::new(Vec::new()),
            peak: AtomicUsize::new(0),
        })
    }

    fn observe(&self) {
        let alive = self
            .produced
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.upgrade().is_some())
            .count();
        self.peak.fetch_max(alive, Ordering::SeqCst);
    }

    fn produce(&self, tensor: &SharedTensor) {
        self.produced.lock().unwrap().push(Arc::downgrade(tensor));
    }

    fn take_peak(&self) -> usize {
        self.peak.swap(0, Ordering::SeqCst)
    }
}

impl TensorFunction for PeakTracking {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        self.observe();
        let value = self.inner.value(inputs)?;
        self.produce(&value);
        Ok(value)
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        self.observe();
        let derivative = self.inner.gradient(inputs)?;
        self.produce(&derivative.value);
        Ok(derivative)
    }
}

#[test]
fn test_intermediates_released_during_call() {
    let tracking = PeakTracking::new(functions::sigmoid());

    let mut builder = GraphBuilder::new();
    let x = builder.add_variable("x");
    let mut last: Node = x.into();
    for i in 0..20 {
        last = builder
            .add_operation(format!("s{i}"), tracking.clone(), &[last])
            .unwrap()
            .into();
    }
    let graph = builder.build_graph();
    let inputs = graph
        .create_variable_values([(x, shared(vec![0.1, 0.2, 0.3], &[3]))])
        .unwrap();

    // Each link sees only the tensor it is reading; earlier links are gone.
    drop(graph.value(last, &inputs).unwrap());
    assert_eq!(tracking.take_peak(), 1);

    drop(graph.partial_gradient(last, &[x], &inputs).unwrap());
    assert_eq!(tracking.take_peak(), 1);
}

#[test]
fn test_deep_chain_evaluates() {
    let mut builder = GraphBuilder::new();
    let x = builder.add_variable("x");
    let mut last: Node = x.into();
    for i in 0..10_000 {
        last = builder
            .add_operation(format!("neg{i}"), functions::negative(), &[last])
            .unwrap()
            .into();
    }
    let graph = builder.build_graph();
    let inputs = graph
        .create_variable_values([(x, Tensor::scalar(2.0).into_shared())])
        .unwrap();

    let derivative = graph.partial_gradient(last, &[x], &inputs).unwrap();
    assert_eq!(*derivative.value, Tensor::scalar(2.0));
    assert_eq!(*derivative.jacobians[0], Tensor::scalar(1.0));
}

#[test]
fn test_graph_shared_across_threads() {
    let mut builder = GraphBuilder::new();
    let (w, x, b, y) = affine(&mut builder);
    let graph = builder.build_graph();

    let expected: Vec<SharedTensor> = (0..4)
        .map(|i| {
            let inputs = graph
                .create_variable_values([
                    (w, shared(vec![1.0, 2.0, 3.0, 4.0], &[2, 2])),
                    (x, shared(vec![i as f64, 1.0], &[2])),
                    (b, shared(vec![0.0, 0.0], &[2])),
                ])
                .unwrap();
            graph.value(y, &inputs).unwrap()
        })
        .collect();

    std::thread::scope(|scope| {
        for (i, expected) in expected.iter().enumerate() {
            let graph = &graph;
            scope.spawn(move || {
                let inputs = graph
                    .create_variable_values([
                        (w, shared(vec![1.0, 2.0, 3.0, 4.0], &[2, 2])),
                        (x, shared(vec![i as f64, 1.0], &[2])),
                        (b, shared(vec![0.0, 0.0], &[2])),
                    ])
                    .unwrap();
                let derivative = graph.partial_gradient(y, &[x], &inputs).unwrap();
                assert_eq!(*derivative.value, **expected);
            });
        }
    });
}
