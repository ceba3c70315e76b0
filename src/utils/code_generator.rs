use parking_lot::Mutex;
use rand::SeedableRng;
use rand::distr::{Alphanumeric, SampleString};
use rand::rngs::StdRng;

/// 短码字符集：与 `Alphanumeric` 分布一致的 62 个字符
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 短码生成器
///
/// 进程内只播种一次，之后每个字符都从 `ALPHABET` 中均匀抽取。
/// 不是密码学安全的随机数，短码也不应被当作凭据。
pub struct CodeGenerator {
    rng: Mutex<StdRng>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::with_seed(rand::random::<u64>())
    }

    /// 固定种子，便于测试复现
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self, length: usize) -> String {
        let mut rng = self.rng.lock();
        Alphanumeric.sample_string(&mut *rng, length)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
