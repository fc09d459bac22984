use blkcol_dijkstra::input::{parse_matrix, DEFAULT_INFINITY};
use blkcol_dijkstra::{solve, DenseMatrix, SsspError, UNREACHABLE};

const CHAIN: &str = "4\n\
    0 1 1000000 4\n\
    1000000 0 2 1000000\n\
    1000000 1000000 0 1000000\n\
    1000000 1000000 1000000 0\n";

fn chain() -> DenseMatrix {
    parse_matrix(CHAIN, DEFAULT_INFINITY).unwrap()
}

#[test]
fn single_worker() {
    let paths = solve(&chain(), 1).unwrap();
    assert_eq!(paths.dist(), &[0, 1, 3, 4]);
    assert_eq!(paths.pred(), &[None, Some(0), Some(1), Some(0)]);
    assert_eq!(paths.path_to(2), Some(vec![0, 1, 2]));
}

#[test]
fn worker_count_does_not_change_the_tree() {
    let one = solve(&chain(), 1).unwrap();
    for workers in [2, 4] {
        assert_eq!(solve(&chain(), workers).unwrap(), one, "{workers} workers");
    }
}

#[test]
fn disconnected_vertex_stays_unreachable() {
    let m = DenseMatrix::from_edges(4, &[(0, 1, 1), (0, 2, 5), (1, 2, 2)]);
    let paths = solve(&m, 2).unwrap();
    assert_eq!(paths.dist(), &[0, 1, 3, UNREACHABLE]);
    assert!(!paths.is_reachable(3));
    assert_eq!(paths.path_to(3), None);
}

#[test]
fn indivisible_worker_count_aborts() {
    let m = DenseMatrix::from_edges(5, &[(0, 1, 1)]);
    assert!(matches!(
        solve(&m, 2),
        Err(SsspError::Indivisible {
            vertices: 5,
            workers: 2
        })
    ));
    assert!(matches!(solve(&m, 0), Err(SsspError::ZeroWorkers)));
}

#[test]
fn repeated_runs_agree() {
    let first = solve(&chain(), 2).unwrap();
    for _ in 0..5 {
        assert_eq!(solve(&chain(), 2).unwrap(), first);
    }
}

#[test]
fn source_only_graph() {
    let m = DenseMatrix::from_edges(1, &[]);
    let paths = solve(&m, 1).unwrap();
    assert_eq!(paths.dist(), &[0]);
    assert_eq!(paths.pred(), &[None]);
}

#[test]
fn rendered_tables() {
    let paths = solve(&chain(), 2).unwrap();
    let mut out = Vec::new();
    paths.write_dists(&mut out).unwrap();
    paths.write_paths(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let expected = "  v    dist 0->v\n\
                    ----   ---------\n  \
                    1          1\n  \
                    2          3\n  \
                    3          4\n\
                    \n  \
                    v     Path 0->v\n\
                    ----    ---------\n  \
                    1:    0 1 \n  \
                    2:    0 1 2 \n  \
                    3:    0 3 \n";
    assert_eq!(text, expected);
}

#[test]
fn equal_length_paths_prefer_lower_vertex() {
    // 0->1->3 and 0->2->3 both cost 4; 1 settles before 2 and claims 3 first
    let m = DenseMatrix::from_edges(4, &[(0, 1, 2), (0, 2, 2), (1, 3, 2), (2, 3, 2)]);
    for workers in [1, 2, 4] {
        let paths = solve(&m, workers).unwrap();
        assert_eq!(paths.dist(), &[0, 2, 2, 4]);
        assert_eq!(paths.pred()[3], Some(1), "{workers} workers");
    }
}
