use crate::diagnostic::Diagnostic;
use crate::gpu::{groups_2d, launch, BufferSpec, GpuContext, KernelProgram};
use crate::harness::compare::check_close;
use crate::harness::data;
use crate::harness::registry::{TestCase, TestSuite};

pub const SUITE: TestSuite = TestSuite {
    name: "matrix_mul",
    tests: &[
        TestCase {
            name: "matches_host_reference",
            run: matches_host_reference,
        },
        TestCase {
            name: "identity_returns_input",
            run: identity_returns_input,
        },
    ],
};

/// Row-major `m x k` times `k x n` on the host, accumulating in the same
/// order as the kernel's inner loop.
pub fn matmul_reference(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0_f32; m * n];
    for row in 0..m {
        for col in 0..n {
            let mut acc = 0.0_f32;
            for j in 0..k {
                acc += a[row * k + j] * b[j * n + col];
            }
            c[row * n + col] = acc;
        }
    }
    c
}

fn matches_host_reference(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const M: usize = 64;
    const K: usize = 32;
    const N: usize = 128;
    let a = data::uniform(M * K, 0.0, 1.0, 0x3a32_0001);
    let b = data::uniform(K * N, 0.0, 1.0, 0x3a32_0002);
    let expected = matmul_reference(&a, &b, M, K, N);

    let outputs = launch(
        ctx,
        program,
        "matrix_mul",
        &[
            BufferSpec::Input(&a),
            BufferSpec::Input(&b),
            BufferSpec::Output(M * N),
        ],
        &[M as u32, K as u32, N as u32],
        groups_2d(M, N),
    )?;
    check_close("matrix_mul", &expected, &outputs[0])
}

fn identity_returns_input(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const DIM: usize = 32;
    let mut identity = vec![0.0_f32; DIM * DIM];
    for i in 0..DIM {
        identity[i * DIM + i] = 1.0;
    }
    let b = data::uniform(DIM * DIM, 0.0, 1.0, 0x3a32_0003);

    let outputs = launch(
        ctx,
        program,
        "matrix_mul",
        &[
            BufferSpec::Input(&identity),
            BufferSpec::Input(&b),
            BufferSpec::Output(DIM * DIM),
        ],
        &[DIM as u32, DIM as u32, DIM as u32],
        groups_2d(DIM, DIM),
    )?;
    check_close("matrix_mul", &b, &outputs[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_reference_small() {
        // [1 2; 3 4] * [5 6; 7 8] = [19 22; 43 50]
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        assert_eq!(matmul_reference(&a, &b, 2, 2, 2), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_reference_rectangular() {
        // 1x3 * 3x2
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        assert_eq!(matmul_reference(&a, &b, 1, 3, 2), vec![4.0, 5.0]);
    }
}
