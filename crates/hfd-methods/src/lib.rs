//! # hfd-methods
//!
//! The finite-difference engine: composite non-uniform meshers, sparse
//! difference operators on tensor-product grids, the ADI operator-splitting
//! scheme family, and the backward (pricing) and forward (Fokker-Planck)
//! solvers built on top of them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Finite-difference building blocks and solvers.
pub mod finite_differences;

pub use finite_differences::{
    boundary::{apply_boundary_set, BoundarySet, BoundarySide, FdmDirichletBoundary},
    fokker_planck::{
        dirac_delta, mesher_integral, FdmHestonGreensFct, FokkerPlanckSolver, GreensFctAlgorithm,
    },
    layout::FdmLinearOpLayout,
    mesher::{
        black_scholes_log_mesher, CriticalPoint, FdmHestonVarianceMesher, FdmMesherComposite,
        Mesher1d,
    },
    operators::{
        black_scholes_fwd_op::FdmBlackScholesFwdOp,
        heston_fwd_op::FdmHestonFwdOp,
        heston_op::FdmHestonOp,
        square_root_fwd_op::{FdmSquareRootFwdOp, TransformationType},
        FdmLinearOpComposite,
    },
    schemes::{
        CraigSneydScheme, DouglasScheme, ExplicitEulerScheme, FdmSchemeDesc, FdmSchemeType,
        HundsdorferScheme, ModifiedCraigSneydScheme,
    },
    solver::{Fdm2dSolution, FdmBackwardSolver},
    step_conditions::{
        AmericanExerciseCondition, DividendCondition, FdmStepConditionComposite, StepCondition,
    },
    triple_band::{FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp},
};
