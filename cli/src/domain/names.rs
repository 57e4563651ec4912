//! Two-word instance name generator (`<adjective>-<noun>`).
//!
//! Words are drawn from the operating system's CSPRNG so names are not
//! predictable from earlier ones. Collisions are possible and tolerated.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::domain::error::NameError;

pub const ADJECTIVES: &[&str] = &[
    "admiring", "adoring", "agitated", "amazing", "angry", "awesome", "beautiful", "blissful",
    "bold", "boring", "brave", "busy", "charming", "clever", "cool", "compassionate",
    "competent", "condescending", "confident", "cranky", "crazy", "dazzling", "determined",
    "distracted", "dreamy", "eager", "ecstatic", "elastic", "elated", "elegant", "eloquent",
    "epic", "exciting", "fervent", "festive", "flamboyant", "focused", "friendly", "frosty",
    "funny", "gallant", "gifted", "goofy", "gracious", "great", "happy", "hardcore",
    "heuristic", "hopeful", "hungry", "infallible", "inspiring", "intelligent", "interesting",
    "jolly", "jovial", "keen", "kind", "laughing", "loving", "lucid", "magical", "mystical",
    "modest", "musing", "naughty", "nervous", "nice", "nifty", "nostalgic", "objective",
    "optimistic", "peaceful", "pedantic", "pensive", "practical", "priceless", "quirky",
    "quizzical", "recursing", "relaxed", "reverent", "romantic", "sad", "serene", "sharp",
    "silly", "sleepy", "stoic", "strange", "stupefied", "suspicious", "sweet", "tender",
    "thirsty", "trusting", "unruffled", "upbeat", "vibrant", "vigilant", "vigorous", "wizardly",
    "wonderful", "xenodochial", "youthful", "zealous", "zen",
];

pub const NOUNS: &[&str] = &[
    "albattani", "allen", "almeida", "agnesi", "archimedes", "ardinghelli", "aryabhata",
    "austin", "babbage", "banach", "banzai", "bardeen", "bartik", "bassi", "beaver", "bell",
    "benz", "bhabha", "bhaskara", "black", "blackburn", "blackwell", "bohr", "booth", "borg",
    "bose", "bouman", "boyd", "brahmagupta", "brattain", "brown", "buck", "burnell", "cannon",
    "carson", "cartwright", "carver", "cerf", "chandrasekhar", "chaplygin", "chatelet",
    "chatterjee", "chebyshev", "clarke", "cohen", "colden", "cori", "cray", "curie", "curran",
    "darwin", "davinci", "dewdney", "dhawan", "diffie", "dijkstra", "dirac", "driscoll",
    "dubinsky", "easley", "edison", "einstein", "elbakyan", "elgamal", "elion", "ellis",
    "engelbart", "euclid", "euler", "faraday", "feistel", "fermat", "fermi", "feynman",
    "franklin", "gagarin", "galileo", "galois", "ganguly", "gates", "gauss", "germain",
    "goldberg", "goldstine", "goldwasser", "golick", "goodall", "gould", "greider",
    "grothendieck", "haibt", "hamilton", "haslett", "hawking", "heisenberg", "hellman",
    "hermann", "herschel", "hertz", "heyrovsky", "hodgkin", "hofstadter", "hoover", "hopper",
    "hugle", "hypatia", "ishizaka", "jackson", "jang", "jemison", "jennings", "jepsen",
    "johnson", "joliot", "jones", "kalam", "kapitsa", "kare", "keldysh", "keller", "kepler",
    "khayyam", "khorana", "kilby", "kirch", "knuth", "kowalevski", "lalande", "lamarr",
    "lamport", "leakey", "leavitt", "lederberg", "lehmann", "lewin", "lichterman", "liskov",
    "lovelace", "lumiere", "mahavira", "margulis", "matsumoto", "maxwell", "mayer", "mccarthy",
    "mcclintock", "mclaren", "mclean", "mcnulty", "meitner", "mendel", "mendeleev", "meninsky",
    "merkle", "mestorf", "minsky", "mirzakhani", "moore", "morse", "murdock", "moser", "napier",
    "nash", "neumann", "newton", "nightingale", "nobel", "noether", "northcutt", "noyce",
    "panini", "pare", "pascal", "pasteur", "payne", "perlman", "pike", "poincare", "poitras",
    "proskuriakova", "ptolemy", "raman", "ramanujan", "ride", "montalcini", "ritchie", "rhodes",
    "robinson", "roentgen", "rosalind", "rubin", "saha", "sammet", "sanderson", "satoshi",
    "shamir", "shannon", "shaw", "shirley", "shockley", "shtern", "sinoussi", "snyder",
    "solomon", "spence", "stonebraker", "sutherland", "swanson", "swartz", "swirles", "taussig",
    "tereshkova", "tesla", "tharp", "thompson", "torvalds", "tu", "turing", "varahamihira",
    "vaughan", "visvesvaraya", "volhard", "villani", "wah", "wiles", "williams", "williamson",
    "wilson", "wing", "wozniak", "wright", "wu", "yalow", "yonath", "zhukovsky",
];

/// Generate a random `<adjective>-<noun>` name from the OS random source.
///
/// # Errors
///
/// Returns an error only if the random source fails.
pub fn generate_name() -> Result<String, NameError> {
    generate_name_with(&mut OsRng)
}

/// Generate a name from the supplied cryptographic RNG.
///
/// # Errors
///
/// Returns an error if `rng` fails to produce bytes.
pub fn generate_name_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<String, NameError> {
    let adjective = pick(rng, ADJECTIVES)?;
    let noun = pick(rng, NOUNS)?;
    Ok(format!("{adjective}-{noun}"))
}

/// Uniform choice via rejection sampling, so no word is favoured by modulo bias.
fn pick<'a, R: RngCore + CryptoRng>(rng: &mut R, words: &[&'a str]) -> Result<&'a str, NameError> {
    let len = words.len() as u64;
    if len == 0 {
        return Err(NameError::EmptyWordList);
    }
    let zone = u64::MAX - (u64::MAX % len);
    loop {
        let mut buf = [0u8; 8];
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| NameError::RandomSource(e.to_string()))?;
        let value = u64::from_le_bytes(buf);
        if value < zone {
            #[allow(clippy::cast_possible_truncation)] // value % len < words.len()
            let index = (value % len) as usize;
            return Ok(words[index]);
        }
    }
}
